use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use invoice_engine::{events::EventHandlers, InvoiceFlowApi, IpnApi, SqliteDatabase};
use log::*;
use nowpayments_tools::NowPaymentsApi;
use teloxide::Bot;

use crate::{
    bot::{run_command_loop, CommandContext},
    config::{ServerConfig, IPN_SIGNATURE_HEADER},
    errors::ServerError,
    middleware::IpnSignatureMiddlewareFactory,
    notifier::{paid_order_alert_hooks, TelegramNotifier},
    routes::{health, index, IpnWebhookRoute},
};

const EVENT_BUFFER_SIZE: usize = 25;
const MAX_DB_CONNECTIONS: u32 = 25;

/// Runs the IPN listener and the Telegram command loop side by side. Returns when either of them stops.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let bot = Bot::new(config.bot.token.reveal());
    let gateway = NowPaymentsApi::new(config.nowpayments.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let hooks = paid_order_alert_hooks(
        Some(TelegramNotifier::new(bot.clone())),
        config.bot.admin_id,
        config.bot.notify_timeout,
    );
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers();

    let ipn_api = IpnApi::new(db.clone(), producers);
    let srv = create_server_instance(&config, ipn_api)?;
    let context = CommandContext::new(InvoiceFlowApi::new(db), gateway, config.bot.admin_id);

    info!("🚀️ Listening for payment notifications on {}:{}", config.host, config.port);
    tokio::select! {
        result = srv => result.map_err(|e| ServerError::Unspecified(e.to_string())),
        _ = run_command_loop(bot, context) => {
            info!("🚀️ The command loop has exited. Shutting down.");
            Ok(())
        },
    }
}

/// Builds the HTTP server: the health routes, plus the IPN webhook at `/ipn` behind the signature check.
pub fn create_server_instance(config: &ServerConfig, ipn_api: IpnApi<SqliteDatabase>) -> Result<Server, ServerError> {
    let ipn_api = web::Data::new(ipn_api);
    let ipn_secret = config.nowpayments.ipn_secret.clone();
    let ipn_checks = config.ipn_checks;
    let srv = HttpServer::new(move || {
        let ipn_scope = web::scope("/ipn")
            .wrap(IpnSignatureMiddlewareFactory::new(IPN_SIGNATURE_HEADER, ipn_secret.clone(), ipn_checks))
            .service(IpnWebhookRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ipn::access_log"))
            .app_data(ipn_api.clone())
            .service(health)
            .service(index)
            .service(ipn_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
