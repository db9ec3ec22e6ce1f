//! Configuration struct for the bootconf demo application.
//!
//! Every tagged field becomes a flag, an environment variable and a config
//! file key. With the prefix `BOOTCONF_DEMO`:
//!
//! | Flag              | Env var                        | File key       |
//! |-------------------|--------------------------------|----------------|
//! | `--title`, `-t`   | `BOOTCONF_DEMO_TITLE`          | `title`        |
//! | (none)            | `BOOTCONF_DEMO_TEXT`           | `text`         |
//! | `--port`, `-p`    | `BOOTCONF_DEMO_PORT`           | `port`         |
//! | `--verbose`       | `BOOTCONF_DEMO_VERBOSE`        | `verbose`      |
//! | `--idle-timeout`  | `BOOTCONF_DEMO_IDLE_TIMEOUT`   | `idle-timeout` |

use std::time::Duration;

use bootconf::{Field, Schema};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DemoConfig {
    /// Shown in the banner.
    pub title: String,

    /// Free text. Not a flag, so it comes only from the file or env.
    pub text: String,

    pub port: u32,

    pub verbose: bool,

    #[serde(with = "bootconf::duration::serde")]
    pub idle_timeout: Duration,
}

impl Schema for DemoConfig {
    const FIELDS: &'static [Field] = &[
        Field::of::<String>("title")
            .tag("title")
            .short('t')
            .default("12")
            .desc("AppTitle"),
        Field::of::<String>("text").tag("text,omitempty"),
        Field::of::<u32>("port")
            .tag("port")
            .short('p')
            .default("8080")
            .desc("Port to listen on"),
        Field::of::<bool>("verbose").tag("verbose").desc("Print every value"),
        Field::of::<Duration>("idle_timeout")
            .tag("idle-timeout")
            .default("90s")
            .desc("Close idle connections after this long"),
    ];
}
