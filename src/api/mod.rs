//! Operator API
//!
//! REST endpoints for operators: service health, the status registry snapshot,
//! and the governance multisig flow (describe and confirm a transaction).

use anyhow::{Context, Result};
use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use warp::{
    http::{Method, StatusCode},
    Filter, Rejection, Reply,
};

use crate::abi;
use crate::config::Config;
use crate::error::GovernanceError;
use crate::governance::{ConfirmOutcome, GovernanceClient, TransactionView};
use crate::status::{StatusRegistry, StatusSnapshot};

// ============================================================================
// SHARED REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Request body for both governance endpoints.
#[derive(Debug, Deserialize)]
pub struct GovernanceRequest {
    /// Governance multisig wallet address
    pub multisig: String,
    pub transaction_id: u64,
}

type SharedGovernance = Option<Arc<GovernanceClient>>;

// ============================================================================
// API HANDLERS
// ============================================================================

/// Handler for the status endpoint.
pub async fn get_status_handler(status: StatusRegistry) -> Result<impl warp::Reply, warp::Rejection> {
    let snapshot: StatusSnapshot = status.snapshot().await;
    Ok(warp::reply::json(&ApiResponse::ok(snapshot)))
}

fn resolve_request(
    governance: &SharedGovernance,
    request: &GovernanceRequest,
) -> Result<(Arc<GovernanceClient>, ethereum_types::H160), GovernanceError> {
    let client = governance.clone().ok_or(GovernanceError::NotConfigured)?;
    let multisig = abi::parse_address(&request.multisig)
        .map_err(|_| GovernanceError::InvalidMultisig(request.multisig.clone()))?;
    Ok((client, multisig))
}

/// Handler for describing a governance multisig transaction.
///
/// # Arguments
///
/// * `request` - Multisig address and transaction id
/// * `governance` - Governance client, absent if no governance chain is configured
///
/// # Returns
///
/// * `Ok(warp::Reply)` - JSON response with the decoded transaction or an error message
pub async fn get_transaction_handler(
    request: GovernanceRequest,
    governance: SharedGovernance,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match resolve_request(&governance, &request) {
        Ok((client, multisig)) => client
            .get_transaction(multisig, U256::from(request.transaction_id))
            .await,
        Err(e) => Err(e),
    };

    match result {
        Ok(view) => Ok(warp::reply::json(&ApiResponse::ok(view))),
        Err(e) => {
            error!("getTransaction {} failed: {}", request.transaction_id, e);
            Ok(warp::reply::json(&ApiResponse::<TransactionView>::err(e.to_string())))
        }
    }
}

/// Handler for confirming a governance multisig transaction.
///
/// # Arguments
///
/// * `request` - Multisig address and transaction id
/// * `governance` - Governance client, absent if no governance chain is configured
///
/// # Returns
///
/// * `Ok(warp::Reply)` - JSON response with the confirm outcome or an error message
pub async fn confirm_transaction_handler(
    request: GovernanceRequest,
    governance: SharedGovernance,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match resolve_request(&governance, &request) {
        Ok((client, multisig)) => client.confirm(multisig, U256::from(request.transaction_id)).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            info!("confirmTransaction {}: {:?}", request.transaction_id, outcome);
            Ok(warp::reply::json(&ApiResponse::ok(outcome)))
        }
        Err(e) => {
            error!("confirmTransaction {} failed: {}", request.transaction_id, e);
            Ok(warp::reply::json(&ApiResponse::<ConfirmOutcome>::err(e.to_string())))
        }
    }
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Creates a warp filter that provides access to the status registry.
pub fn with_status(
    status: StatusRegistry,
) -> impl Filter<Extract = (StatusRegistry,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || status.clone())
}

/// Creates a warp filter that provides access to the governance client.
pub fn with_governance(
    governance: SharedGovernance,
) -> impl Filter<Extract = (SharedGovernance,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || governance.clone())
}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Creates a CORS filter based on the configured allowed origins.
fn create_cors_filter(allowed_origins: &[String]) -> warp::cors::Builder {
    let methods = vec![Method::GET, Method::POST, Method::OPTIONS];

    if allowed_origins.iter().any(|o| o == "*") {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods)
            .allow_headers(vec!["content-type"])
    } else {
        warp::cors()
            .allow_origins(allowed_origins.iter().map(|s| s.as_str()))
            .allow_methods(methods)
            .allow_headers(vec!["content-type"])
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
///
/// Converts warp rejections into standardized API responses with matching
/// HTTP status codes.
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if let Some(err) = rej.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", err))
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::<()>::err(message)),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server for validator operators.
pub struct ApiServer {
    config: Arc<Config>,
    status: StatusRegistry,
    governance: SharedGovernance,
}

impl ApiServer {
    pub fn new(config: Config, status: StatusRegistry, governance: Option<GovernanceClient>) -> Self {
        Self {
            config: Arc::new(config),
            status,
            governance: governance.map(Arc::new),
        }
    }

    /// Starts the API server on the configured host and port.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server stopped
    /// * `Err(anyhow::Error)` - Failed to parse the bind address
    pub async fn run(&self) -> Result<()> {
        info!("Starting API server on {}:{}", self.config.api.host, self.config.api.port);

        let routes = self.create_routes();

        let addr: std::net::SocketAddr = format!("{}:{}", self.config.api.host, self.config.api.port)
            .parse()
            .context("Failed to parse API server address")?;

        warp::serve(routes).run(addr).await;

        Ok(())
    }

    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        let health = warp::path("health").and(warp::get()).map(|| {
            warp::reply::json(&ApiResponse::ok("Bridge Validator is running".to_string()))
        });

        let status = warp::path("status")
            .and(warp::get())
            .and(with_status(self.status.clone()))
            .and_then(get_status_handler);

        let transaction = warp::path!("governance" / "transaction")
            .and(warp::post())
            .and(warp::body::json())
            .and(with_governance(self.governance.clone()))
            .and_then(get_transaction_handler);

        let confirm = warp::path!("governance" / "confirm")
            .and(warp::post())
            .and(warp::body::json())
            .and(with_governance(self.governance.clone()))
            .and_then(confirm_transaction_handler);

        health
            .or(status)
            .or(transaction)
            .or(confirm)
            .with(create_cors_filter(&self.config.api.cors_origins))
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    pub fn test_routes(&self) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}
