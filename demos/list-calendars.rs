//! This is an example of how gdata-calendar can be used: it lists the calendars of an account, and their upcoming events

use std::path::Path;
use std::sync::Arc;

use gdata_calendar::AccountSession;
use gdata_calendar::ServiceConfig;
use gdata_calendar::transport::http::HttpTransport;

const ACCOUNT_VAR: &str = "GCAL_ACCOUNT";
const PASSWORD_VAR: &str = "GCAL_PASSWORD";
const CONFIG_VAR: &str = "GCAL_CONFIG";


#[tokio::main]
async fn main() {
    env_logger::init();

    println!("This example lists the calendars of an account, and the events they contain.");
    println!("Set the {} and {} environment variables to your credentials.", ACCOUNT_VAR, PASSWORD_VAR);
    println!("You can also point {} to a JSON configuration file, and set RUST_LOG to display more info.", CONFIG_VAR);
    println!("");

    let (account, password) = match (std::env::var(ACCOUNT_VAR), std::env::var(PASSWORD_VAR)) {
        (Ok(account), Ok(password)) => (account, password),
        _ => {
            log::error!("Missing {} or {}", ACCOUNT_VAR, PASSWORD_VAR);
            return;
        },
    };

    let config = match std::env::var(CONFIG_VAR) {
        Err(_) => ServiceConfig::default(),
        Ok(path) => match ServiceConfig::from_file(Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Invalid configuration file: {}. Using the default configuration", err);
                ServiceConfig::default()
            },
        },
    };

    let transport = HttpTransport::new(&config);
    let mut session = AccountSession::with_config(Arc::new(transport), config);

    if let Err(err) = session.authenticate(&account, &password).await {
        log::error!("Unable to log in: {}", err);
        return;
    }

    let calendars = match session.calendars().await {
        Ok(calendars) => calendars,
        Err(err) => {
            log::error!("Unable to list calendars: {}", err);
            return;
        },
    };

    for calendar in calendars {
        println!("CAL {} ({}){}", calendar.title(), calendar.id().unwrap_or("?"), if calendar.is_public() { " [public]" } else { "" });
        match calendar.events().await {
            Err(err) => log::warn!("Unable to list the events of {}: {}", calendar.title(), err),
            Ok(events) => {
                for event in events {
                    println!("    {}", event);
                }
            },
        }
    }
}
