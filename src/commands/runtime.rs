use crate::cli::{
    BookingCommands, Cli, Commands, GuestCommands, ListingCommands, MessageCommands,
    PropertyCommands,
};
use crate::domain::models::{Booking, Guest, Listing, OutboundMessage, Property};
use crate::services::dispatch::Dispatcher;
use crate::services::identity::AuthState;
use crate::services::output::{print_one, print_out};
use crate::services::search::{annotate_keys, SearchWorker};
use crate::services::tenant::TenantContext;

pub fn handle_runtime_commands(
    cli: &Cli,
    tenant: &TenantContext,
    session: &AuthState,
    dispatcher: &Dispatcher,
) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Properties { command } => match command {
            PropertyCommands::List => {
                let items: Vec<Property> = dispatcher.get_json(tenant, "/properties")?;
                print_out(cli.json, &items, |p| {
                    format!("{}\t{}\t{}", p.id, p.name, p.address.as_deref().unwrap_or("-"))
                })?;
            }
            PropertyCommands::Show { id } => {
                let item: Property = dispatcher.get_json(tenant, &format!("/properties/{id}"))?;
                print_one(cli.json, item, |p| format!("{}\t{}", p.id, p.name))?;
            }
        },
        Commands::Listings { command } => match command {
            ListingCommands::List { property } => {
                let path = match property {
                    Some(id) => format!("/listings?property_id={id}"),
                    None => "/listings".to_string(),
                };
                let items: Vec<Listing> = dispatcher.get_json(tenant, &path)?;
                print_out(cli.json, &items, |l| {
                    format!("{}\t{}\t{}", l.id, l.property_id, l.title)
                })?;
            }
        },
        Commands::Bookings { command } => match command {
            BookingCommands::List { property } => {
                let path = match property {
                    Some(id) => format!("/bookings?property_id={id}"),
                    None => "/bookings".to_string(),
                };
                let items: Vec<Booking> = dispatcher.get_json(tenant, &path)?;
                print_out(cli.json, &items, |b| {
                    format!(
                        "{}\t{}\t{}..{}\t{}",
                        b.id, b.guest_id, b.check_in, b.check_out, b.status
                    )
                })?;
            }
            BookingCommands::Show { id } => {
                let item: Booking = dispatcher.get_json(tenant, &format!("/bookings/{id}"))?;
                print_one(cli.json, item, |b| format!("{}\t{}", b.id, b.status))?;
            }
        },
        Commands::Guests { command } => match command {
            GuestCommands::List => {
                let items: Vec<Guest> = dispatcher.get_json(tenant, "/guests")?;
                print_out(cli.json, &items, |g| {
                    format!("{}\t{}\t{}", g.id, g.name, g.email.as_deref().unwrap_or("-"))
                })?;
            }
            GuestCommands::Search { query } => {
                let guests: Vec<Guest> = dispatcher.get_json(tenant, "/guests")?;
                let worker = SearchWorker::spawn();
                let reply = worker.submit(query, annotate_keys(guests));
                let ranked = reply.recv()?;
                print_out(cli.json, &ranked, |g| {
                    format!("{}\t{}\t{}", g.id, g.name, g.phone.as_deref().unwrap_or("-"))
                })?;
            }
        },
        Commands::Messages { command } => match command {
            MessageCommands::Send {
                guest,
                subject,
                body,
            } => {
                session.require_billing_unlocked()?;
                let message = OutboundMessage {
                    guest_id: guest.clone(),
                    subject: subject.clone(),
                    body: body.clone(),
                };
                let sent: serde_json::Value =
                    dispatcher.post_json(tenant, "/messages", serde_json::to_value(&message)?)?;
                print_one(cli.json, sent, |_| format!("message sent to {guest}"))?;
            }
        },
        _ => return Ok(false),
    }
    Ok(true)
}
