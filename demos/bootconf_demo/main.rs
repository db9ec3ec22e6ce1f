//! # bootconf demo application
//!
//! A sample program that loads its configuration with bootconf at startup
//! and keeps it in a process-wide cell. It exists to demonstrate and
//! manually verify the layering.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example bootconf_demo
//! cargo run --example bootconf_demo -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature            | How to exercise it                                                    |
//! |--------------------|-----------------------------------------------------------------------|
//! | Declared defaults  | `cargo run --example bootconf_demo`                                   |
//! | Config file        | Create `config.toml` in cwd with `title = "from file"`, then run      |
//! | Other file format  | `cargo run --example bootconf_demo -- -c settings.json`               |
//! | Env var override   | `BOOTCONF_DEMO_TITLE=env cargo run --example bootconf_demo`           |
//! | Omitted field      | `BOOTCONF_DEMO_TEXT=hello cargo run --example bootconf_demo`          |
//! | Flag override      | `cargo run --example bootconf_demo -- -t flag --verbose`              |
//! | Duration flag      | `cargo run --example bootconf_demo -- --idle-timeout 2m30s`           |
//! | Version            | `cargo run --example bootconf_demo -- --version`                      |

mod config;

use std::sync::OnceLock;

use bootconf::Bootconf;
use bootconf::duration;

use config::DemoConfig;

static CONFIG: OnceLock<DemoConfig> = OnceLock::new();

/// The process-wide configuration, loaded on first use.
fn config() -> &'static DemoConfig {
    CONFIG.get_or_init(|| {
        let mut config = DemoConfig::default();
        Bootconf::builder()
            .version(env!("CARGO_PKG_VERSION"))
            .env_prefix("BOOTCONF_DEMO")
            .bin_name("bootconf-demo")
            .about("bootconf demo: layered configuration for a toy server")
            .init(&mut config);
        config
    })
}

fn main() {
    let config = config();
    println!("{} listening on port {}", config.title, config.port);
    if !config.text.is_empty() {
        println!("{}", config.text);
    }
    if config.verbose {
        println!("  idle-timeout  {}", duration::format(config.idle_timeout));
    }
}
