use crate::domain::model::BirthData;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "bodygraph")]
#[command(about = "Fetch a Human Design chart for the given birth data")]
pub struct CliConfig {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub day: u32,

    #[arg(long)]
    pub month: u32,

    #[arg(long)]
    pub year: i32,

    #[arg(long)]
    pub hour: u32,

    #[arg(long)]
    pub minute: u32,

    #[arg(long)]
    pub country: String,

    #[arg(long)]
    pub city: String,

    #[arg(long, help = "Treat the birth time as UTC instead of local time")]
    pub utc: bool,

    #[arg(long, help = "Path to a TOML settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "180", help = "Overall deadline in seconds")]
    pub deadline_secs: u64,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn to_birth_data(&self) -> BirthData {
        BirthData {
            name: self.name.clone(),
            email: self.email.clone(),
            day: self.day,
            month: self.month,
            year: self.year,
            hour: self.hour,
            minute: self.minute,
            country: self.country.clone(),
            city: self.city.clone(),
            timezone_is_utc: self.utc,
        }
    }
}
