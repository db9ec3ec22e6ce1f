#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use crate::types::{Field, Schema};

    /// The canonical schema: a flagged title, an omitted text field, and a
    /// field outside the configuration surface.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct TitleConfig {
        pub title: String,
        pub text: String,
        pub port: u32,
        pub retries: Option<i64>,
        pub internal: String,
    }

    impl Schema for TitleConfig {
        const FIELDS: &'static [Field] = &[
            Field::of::<String>("title")
                .tag("title")
                .short('t')
                .default("12")
                .desc("AppTitle"),
            Field::of::<String>("text").tag("text,omitempty"),
            Field::of::<u32>("port").tag("port").desc("Listen port"),
            Field::of::<Option<i64>>("retries").tag("retries").default("3"),
            Field::of::<String>("internal"),
        ];
    }

    /// One field of every supported kind, each with a default literal except
    /// `debug`.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct AllKinds {
        pub verbose: bool,
        pub debug: bool,
        pub offset: i32,
        pub big: i64,
        pub workers: u32,
        pub limit: u64,
        pub ratio: f64,
        pub name: String,
        #[serde(with = "crate::duration::serde")]
        pub timeout: Duration,
        #[serde(with = "crate::duration::serde::option")]
        pub idle: Option<Duration>,
    }

    impl Schema for AllKinds {
        const FIELDS: &'static [Field] = &[
            Field::of::<bool>("verbose").tag("verbose").default("true"),
            Field::of::<bool>("debug").tag("debug").short('d'),
            Field::of::<i32>("offset").tag("offset").default("-3"),
            Field::of::<i64>("big").tag("big").default("9000000000"),
            Field::of::<u32>("workers")
                .tag("workers")
                .short('w')
                .default("4")
                .desc("Worker threads"),
            Field::of::<u64>("limit").tag("limit").default("18446744073709551615"),
            Field::of::<f64>("ratio").tag("ratio").default("0.5"),
            Field::of::<String>("name").tag("name").default("svc"),
            Field::of::<Duration>("timeout").tag("timeout").default("5s"),
            Field::of::<Option<Duration>>("idle").tag("idle-timeout,omitempty"),
        ];
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct BadDefault {
        pub name: String,
        pub port: u32,
    }

    impl Schema for BadDefault {
        const FIELDS: &'static [Field] = &[
            Field::of::<String>("name").tag("name").default("ok"),
            Field::of::<u32>("port").tag("port").default("eighty"),
        ];
    }

    /// Uses `-c`, which every command reserves for `--config`.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Clash {
        pub count: u32,
    }

    impl Schema for Clash {
        const FIELDS: &'static [Field] = &[Field::of::<u32>("count").tag("count").short('c')];
    }

    /// Names a field the struct does not have.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Misnamed {
        pub title: String,
    }

    impl Schema for Misnamed {
        const FIELDS: &'static [Field] = &[Field::of::<String>("titel").tag("title")];
    }
}
