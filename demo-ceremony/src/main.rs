mod logging;
mod platform;

use std::{env, sync::Arc, time::Duration};

use passkey_ceremony::{CeremonyController, base64url_encode};

use crate::platform::SimulatedPlatform;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    logging::init_tracing("demo-ceremony");

    let rp_id = env::var("DEMO_RP_ID").unwrap_or_else(|_| "example.com".to_string());
    let use_security_key = env::var("DEMO_USE_SECURITY_KEY")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);
    let failure_code = env::var("DEMO_PLATFORM_FAILURE_CODE")
        .ok()
        .and_then(|v| v.parse::<i64>().ok());

    let platform = SimulatedPlatform {
        security_keys: true,
        failure_code,
        delay: Duration::from_millis(300),
    };
    let controller = CeremonyController::new(Arc::new(platform));
    tracing::info!(policy = ?controller.policy(), "Controller ready");

    let registration = controller
        .register(
            &rp_id,
            &base64url_encode(b"demo registration challenge"),
            "Demo User",
            &base64url_encode(b"demo-user"),
            use_security_key,
        )
        .await;

    let registration = match registration {
        Ok(r) => r,
        Err(kind) => {
            println!("Registration failed: {kind} (retryable: {})", kind.is_retryable());
            return Ok(());
        }
    };
    println!("Registration:\n{}", serde_json::to_string_pretty(&registration)?);

    let assertion = controller
        .authenticate(
            &rp_id,
            &base64url_encode(b"demo assertion challenge"),
            use_security_key,
            Some(registration.id.as_str()),
        )
        .await;

    match assertion {
        Ok(a) => println!("Assertion:\n{}", serde_json::to_string_pretty(&a)?),
        Err(kind) => println!("Assertion failed: {kind} (retryable: {})", kind.is_retryable()),
    }

    Ok(())
}
