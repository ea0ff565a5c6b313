use super::Parser;

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    /// Expire the access token before loading tiles to exercise a silent refresh.
    #[arg(long)]
    pub expire_first: bool,
}
