use clap::Parser;

#[derive(Parser, Debug)]
pub struct FlatConfig {
    #[arg(
        long,
        env = "LOUSHU_API_URL",
        default_value = "http://localhost:8000",
        help = "Base URL of the listing backend"
    )]
    api_url: String,

    #[arg(long, env = "LOUSHU_API_TOKEN", help = "Bearer token for the listing backend")]
    api_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfiguration,
}

#[derive(Debug, Clone)]
pub struct ApiConfiguration {
    pub base_url: String,     // LOUSHU_API_URL
    pub bearer_token: Option<String>, // LOUSHU_API_TOKEN
}

impl From<FlatConfig> for Config {
    fn from(value: FlatConfig) -> Self {
        Config {
            api: ApiConfiguration {
                base_url: value.api_url,
                bearer_token: value.api_token,
            },
        }
    }
}
