use keepnotes::errors::WebClientBuildError;
use keepnotes::{NoteRepository, WebClientBuilder};
use std::time::Duration;

#[derive(serde::Deserialize, Debug)]
pub struct Settings {
    /// Root of the note API; notes live under `{baseurl}/notes`.
    pub baseurl: String,
    pub timeoutsecs: u64,
    pub debug: bool,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeoutsecs)
    }

    /// Repository talking to `base_url`, or to the configured API when `None`.
    pub fn get_note_repository(
        &self,
        base_url: Option<&str>,
    ) -> Result<NoteRepository, WebClientBuildError> {
        let client = WebClientBuilder::new(base_url.unwrap_or(self.baseurl.as_str()))
            .timeout(self.timeout())
            .build()?;
        Ok(NoteRepository::from_api(client))
    }
}

lazy_static! {
    pub static ref CONFIGURATION: Result<Settings, config::ConfigError> = get_configuration();
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let config = config::Config::builder()
        .set_default("debug", false)?
        .set_default("baseurl", "http://localhost:8000/api/v1")?
        .set_default("timeoutsecs", 30)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::default()
                .prefix("keepnotes")
                .separator("_"),
        )
        .build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let settings = get_configuration().expect("Failed to read configuration");
        assert!(settings.baseurl.starts_with("http"));
        assert!(settings.timeoutsecs > 0);
        assert!(settings.get_note_repository(None).is_ok());
    }

    #[test]
    fn reject_bad_base_url() {
        let settings = Settings {
            baseurl: "not a url".to_owned(),
            timeoutsecs: 1,
            debug: false,
        };
        assert_eq!(settings.timeout(), Duration::from_secs(1));
        assert!(settings.get_note_repository(None).is_err());
        assert!(settings
            .get_note_repository(Some("http://127.0.0.1:8000"))
            .is_ok());
    }
}
