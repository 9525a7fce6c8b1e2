use crate::services::recognition_service::NotificationTarget;
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use std::env;

/// Which function this process runs.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Lambda function returning the stored label documents.
    Reader,
    /// Lambda function accepting uploads.
    Uploader,
    /// Local HTTP gateway exposing both functions.
    Serve,
}

impl Mode {
    fn needs_notification_target(self) -> bool {
        matches!(self, Mode::Uploader | Mode::Serve)
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub bucket: String,
    /// Present whenever `mode` can submit video jobs.
    pub notification: Option<NotificationTarget>,
    pub host: String,
    pub port: u16,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Asset upload and gallery functions")]
pub struct Args {
    /// Function to run (overrides ASSET_GALLERY_MODE)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Bucket holding uploads and label documents (overrides BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// SNS topic notified when a video job completes (overrides SNS_TOPIC_ARN)
    #[arg(long)]
    pub sns_topic_arn: Option<String>,

    /// Role Rekognition assumes to publish to the topic (overrides ROLE_ARN)
    #[arg(long)]
    pub role_arn: Option<String>,

    /// Host the gateway binds to (overrides ASSET_GALLERY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port the gateway binds to (overrides ASSET_GALLERY_PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

impl AppConfig {
    /// Parse CLI args + process environment into a validated AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge `args` over values looked up through `lookup_env`, then validate.
    ///
    /// Empty environment values count as unset.
    pub fn resolve(args: Args, lookup_env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |name: &str| lookup_env(name).filter(|v| !v.trim().is_empty());

        let mode = match args.mode {
            Some(mode) => mode,
            None => {
                let raw = lookup("ASSET_GALLERY_MODE")
                    .ok_or_else(|| anyhow!("no mode given: pass --mode or set ASSET_GALLERY_MODE"))?;
                Mode::from_str(&raw, true)
                    .map_err(|err| anyhow!(err))
                    .with_context(|| format!("parsing ASSET_GALLERY_MODE value `{}`", raw))?
            }
        };

        let bucket = args
            .bucket
            .or_else(|| lookup("BUCKET_NAME"))
            .ok_or_else(|| anyhow!("no bucket given: pass --bucket or set BUCKET_NAME"))?;

        let topic_arn = args.sns_topic_arn.or_else(|| lookup("SNS_TOPIC_ARN"));
        let role_arn = args.role_arn.or_else(|| lookup("ROLE_ARN"));
        let notification = match (topic_arn, role_arn) {
            (Some(topic_arn), Some(role_arn)) => Some(NotificationTarget {
                topic_arn,
                role_arn,
            }),
            _ if mode.needs_notification_target() => {
                bail!("{:?} mode requires both SNS_TOPIC_ARN and ROLE_ARN", mode)
            }
            _ => None,
        };

        let env_port = match lookup("ASSET_GALLERY_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing ASSET_GALLERY_PORT value `{}`", value))?,
            None => 3000,
        };

        Ok(Self {
            mode,
            bucket,
            notification,
            host: args
                .host
                .or_else(|| lookup("ASSET_GALLERY_HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port: args.port.unwrap_or(env_port),
        })
    }

    /// Notification target for video jobs; errors when not configured.
    pub fn notification_target(&self) -> Result<NotificationTarget> {
        self.notification
            .clone()
            .context("SNS_TOPIC_ARN and ROLE_ARN must be set to accept uploads")
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn reader_needs_only_a_bucket() {
        let cfg = AppConfig::resolve(
            Args::default(),
            env_from(&[("ASSET_GALLERY_MODE", "reader"), ("BUCKET_NAME", "gallery")]),
        )
        .unwrap();

        assert_eq!(cfg.mode, Mode::Reader);
        assert_eq!(cfg.bucket, "gallery");
        assert!(cfg.notification.is_none());
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn uploader_without_topic_fails_fast() {
        let err = AppConfig::resolve(
            Args::default(),
            env_from(&[
                ("ASSET_GALLERY_MODE", "uploader"),
                ("BUCKET_NAME", "gallery"),
                ("ROLE_ARN", "arn:aws:iam::1:role/r"),
            ]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("SNS_TOPIC_ARN"));
    }

    #[test]
    fn missing_bucket_fails_fast() {
        let err = AppConfig::resolve(
            Args::default(),
            env_from(&[("ASSET_GALLERY_MODE", "reader"), ("BUCKET_NAME", "  ")]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("BUCKET_NAME"));
    }

    #[test]
    fn args_override_environment() {
        let args = Args {
            mode: Some(Mode::Serve),
            bucket: Some("from-args".into()),
            port: Some(8080),
            ..Args::default()
        };
        let cfg = AppConfig::resolve(
            args,
            env_from(&[
                ("ASSET_GALLERY_MODE", "reader"),
                ("BUCKET_NAME", "from-env"),
                ("SNS_TOPIC_ARN", "arn:aws:sns:us-east-1:1:t"),
                ("ROLE_ARN", "arn:aws:iam::1:role/r"),
                ("ASSET_GALLERY_PORT", "9000"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.mode, Mode::Serve);
        assert_eq!(cfg.bucket, "from-args");
        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.notification_target().unwrap().topic_arn,
            "arn:aws:sns:us-east-1:1:t"
        );
    }

    #[test]
    fn invalid_port_and_mode_are_rejected() {
        let bad_port = AppConfig::resolve(
            Args::default(),
            env_from(&[
                ("ASSET_GALLERY_MODE", "reader"),
                ("BUCKET_NAME", "gallery"),
                ("ASSET_GALLERY_PORT", "not-a-port"),
            ]),
        );
        assert!(bad_port.is_err());

        let bad_mode = AppConfig::resolve(
            Args::default(),
            env_from(&[("ASSET_GALLERY_MODE", "writer"), ("BUCKET_NAME", "gallery")]),
        );
        assert!(bad_mode.is_err());
    }
}
