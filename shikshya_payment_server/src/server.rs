use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use shikshya_payment_engine::{SettlementApi, SqliteDatabase};
use wallet_gateways::{EsewaGateway, KhaltiApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{health, VerifyPaymentRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    // The Khalti client carries the provider secret and a connection pool, so build it once and hand clones
    // to the workers.
    let khalti = KhaltiApi::new(config.khalti.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let settlement_api = SettlementApi::new(db.clone());
        let esewa = EsewaGateway::new(config.esewa.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .app_data(web::Data::new(settlement_api))
            .app_data(web::Data::new(esewa))
            .app_data(web::Data::new(khalti.clone()))
            .service(health)
            .service(VerifyPaymentRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
