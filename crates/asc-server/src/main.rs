// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! App Store Connect provisioning server binary.

use std::sync::Arc;

use asc_server::{config, create_router, logging, ServerConfig};
use asc_server_appstore::{AppStoreClient, AppStoreTokenIssuer};
use asc_server_provisioning::Provisioner;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;

/// asc-server - provisions App Store Connect App Managers from identity webhooks.
#[derive(Parser, Debug)]
#[command(
	name = "asc-server",
	about = "App Store Connect App Manager provisioning server",
	version
)]
struct Args {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("asc-server version: {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	logging::init_tracing(&config::logging_from_env()?);

	let config = ServerConfig::from_env()?;

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		base_url = %config.appstore.base_url(),
		email_domain = %config.provisioning.email_domain,
		pass_deadline = ?config.provisioning.pass_deadline,
		"starting asc-server"
	);

	let issuer = AppStoreTokenIssuer::new(&config.appstore);
	issuer.verify_key()?;

	let directory = AppStoreClient::new(config.appstore.clone())?;
	let provisioner = Provisioner::new(
		Arc::new(issuer),
		Arc::new(directory),
		config.provisioning.clone(),
	);

	let app = create_router(provisioner).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	tracing::info!("Server shutdown complete");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
	tracing::info!("Received shutdown signal");
}
