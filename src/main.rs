use riskdesk::app::App;
use riskdesk::domain_port::Navigator;
use riskdesk::logger::*;
use riskdesk::settings::*;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let app = App::try_new(&project_settings).await?;
    app.sign_in(&project_settings.backend.demo_user)?;

    if cli.expire_first {
        info!("expiring access token before loading the dashboard");
        app.backend.expire_access_token();
    }

    let result = app.dashboard().await;

    // Let a pending sign-in redirect land before reporting the route.
    tokio::time::sleep(
        std::time::Duration::from_millis(project_settings.expiry.redirect_delay_ms) * 2,
    )
    .await;

    let report = match result {
        Ok(tiles) => json!({
            "tiles": tiles,
            "route": app.navigator.current_route(),
            "toasts": app.toasts.history(),
        }),
        Err(e) => {
            error!(error = %e, "dashboard failed");
            json!({
                "error": e,
                "route": app.navigator.current_route(),
                "toasts": app.toasts.history(),
            })
        }
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
