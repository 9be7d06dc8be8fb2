use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fmt::{Display, Formatter};

use cohort_lib::{cohort, FormConfig};
use url::Url;

use crate::error::{self, Context};

mod shape;

pub const DEFAULT_URL: &str = "http://localhost/";
pub const DEFAULT_TIMEOUT: u64 = 10;

pub trait TryDefault: Sized {
    type Error;

    fn try_default() -> Result<Self, Self::Error>;
}

/// loads the given config files in order over the default settings.
/// relative paths are resolved from the current working directory.
pub fn load<I>(paths: I) -> error::Result<Settings>
where
    I: IntoIterator<Item = PathBuf>
{
    let cwd = std::env::current_dir()
        .context("failed to retrieve cwd for Settings")?;
    let mut settings = Settings::try_default()?;

    for config_path in paths {
        let full = if config_path.is_absolute() {
            config_path
        } else {
            cwd.join(config_path)
        };

        tracing::debug!("loading config file \"{}\"", full.display());

        let loaded = load_file(&full)?;
        let src = SrcFile::new(&full)?;

        settings.merge(&src, loaded)?;
    }

    tracing::debug!("{settings:#?}");

    Ok(settings)
}

fn load_file(path: &Path) -> error::Result<shape::Settings> {
    let ext = path.extension().context(format!(
        "failed to retrieve the file extension for config file: \"{}\"", path.display()
    ))?;

    let ext = ext.to_ascii_lowercase();
    let file = std::fs::OpenOptions::new()
        .read(true)
        .open(path)
        .context(format!("failed to open config file: \"{}\"", path.display()))?;
    let reader = std::io::BufReader::new(file);

    if ext.eq("yaml") || ext.eq("yml") {
        serde_yaml::from_reader(reader).context(format!(
            "failed to parse yaml config file: \"{}\"", path.display()
        ))
    } else if ext.eq("json") {
        serde_json::from_reader(reader).context(format!(
            "failed to parse json config file: \"{}\"", path.display()
        ))
    } else {
        Err(error::Error::new().context(format!(
            "unknown type of config file: \"{}\"", path.display()
        )))
    }
}

struct SrcFile<'a> {
    parent: &'a Path,
    src: &'a Path,
}

impl<'a> SrcFile<'a> {
    fn new(src: &'a Path) -> error::Result<Self> {
        let parent = src.parent().context(format!(
            "failed to retrieve parent path from source file \"{}\"", src.display()
        ))?;

        Ok(SrcFile {
            parent,
            src
        })
    }
}

impl<'a> Display for SrcFile<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.src.display())
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub remote: Remote,
    pub form: FormConfig,
}

impl Settings {
    fn merge(&mut self, src: &SrcFile<'_>, settings: shape::Settings) -> error::Result<()> {
        if let Some(remote) = settings.remote {
            self.remote.merge(src, remote)?;
        }

        if let Some(form) = settings.form {
            self.form = form;
        }

        Ok(())
    }
}

impl TryDefault for Settings {
    type Error = error::Error;

    fn try_default() -> Result<Self, Self::Error> {
        Ok(Settings {
            remote: Remote::try_default()?,
            form: cohort::upload_config(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Remote {
    pub url: Url,
    pub timeout: Duration,
    pub cookies: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Remote {
    fn merge(&mut self, src: &SrcFile<'_>, remote: shape::Remote) -> error::Result<()> {
        if let Some(url) = remote.url {
            self.url = Url::parse(&url).context(format!(
                "settings.remote.url invalid: \"{url}\" file: {src}"
            ))?;
        }

        if let Some(timeout) = remote.timeout {
            if timeout == 0 {
                return Err(error::Error::new().context(format!(
                    "settings.remote.timeout must be greater than 0 file: {src}"
                )));
            }

            self.timeout = Duration::from_secs(timeout);
        }

        if let Some(cookies) = remote.cookies {
            self.cookies = Some(if cookies.is_absolute() {
                cookies
            } else {
                src.parent.join(cookies)
            });
        }

        if let Some(user_agent) = remote.user_agent {
            self.user_agent = Some(user_agent);
        }

        Ok(())
    }
}

impl TryDefault for Remote {
    type Error = error::Error;

    fn try_default() -> Result<Self, Self::Error> {
        Ok(Remote {
            url: Url::parse(DEFAULT_URL).context("failed to parse default remote url")?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            cookies: None,
            user_agent: None,
        })
    }
}
