use anyhow::Result;
use log::{error, info};
use crate::errors::PanelError;
use crate::initialization::init;
use crate::manager_page::ElementRegion;
use crate::worker::run;

mod config;
mod errors;
mod formatting;
mod initialization;
mod logging;
mod manager_forecast;
mod manager_page;
mod templates;
mod worker;

fn main() -> Result<()> {
    // Load config and set up loader and page. If initialization fails, we
    // can't even log, so the error goes to stderr.
    let (config, mut mgr) = match init() {
        Ok((c, m)) => (c, m),
        Err(e) => {
            return Err(PanelError(format!("Initialization failed: {}", e)).into());
        }
    };

    let mut forecast = ElementRegion::new(&config.page.forecast_id);
    let mut last_update = ElementRegion::new(&config.page.last_update_id);

    run(&mgr.forecast, &mgr.settings, &mut forecast, &mut last_update);

    let updated = mgr.page.apply(&forecast)
        .and_then(|_| mgr.page.apply(&last_update))
        .and_then(|_| mgr.page.save());
    if let Err(e) = updated {
        error!("Page update failed: {}", e);
        return Err(PanelError(e.to_string()).into());
    }

    info!("page {} updated", config.page.path);

    Ok(())
}
