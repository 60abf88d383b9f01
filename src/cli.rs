use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "staydesk", version, about = "Property-management admin console")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Properties {
        #[command(subcommand)]
        command: PropertyCommands,
    },
    Listings {
        #[command(subcommand)]
        command: ListingCommands,
    },
    Bookings {
        #[command(subcommand)]
        command: BookingCommands,
    },
    Guests {
        #[command(subcommand)]
        command: GuestCommands,
    },
    Messages {
        #[command(subcommand)]
        command: MessageCommands,
    },
    Tenant {
        #[command(subcommand)]
        command: TenantCommands,
    },
    Login {
        #[arg(long, help = "Path to an identity-provider profile JSON file")]
        profile: PathBuf,
    },
    Logout,
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    Check {
        #[arg(long, default_value = "src")]
        src_dir: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PropertyCommands {
    List,
    Show { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ListingCommands {
    List {
        #[arg(long)]
        property: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookingCommands {
    List {
        #[arg(long)]
        property: Option<String>,
    },
    Show {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum GuestCommands {
    List,
    Search { query: String },
}

#[derive(Subcommand, Debug)]
pub enum MessageCommands {
    Send {
        #[arg(long)]
        guest: String,
        #[arg(long)]
        subject: Option<String>,
        body: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TenantCommands {
    Show,
    Set { slug: String },
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    Check,
}
