use consentry_agent::{AgentConfig, SenderCredential};
use consentry_types::{AgentError, AgentResult};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Preflight diagnostics: everything that would make a run
/// configuration-fatal is probed here, before any record is processed.
pub async fn run_checks(config_path: &Path) -> AgentResult<()> {
    println!("\x1b[38;5;46mConsentry Preflight Checks\x1b[0m");
    println!("\x1b[38;5;245m{}\x1b[0m", "═".repeat(50));
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let mut warnings = 0;

    print!("[1/4] Configuration:  ");
    std::io::stdout().flush().unwrap();
    let config = if config_path.exists() {
        match AgentConfig::load(config_path) {
            Ok(config) => {
                println!("\x1b[38;5;46mOK\x1b[0m");
                passed += 1;
                Some(config)
            }
            Err(e) => {
                println!("\x1b[38;5;196mFAIL\x1b[0m - {}", e);
                failed += 1;
                None
            }
        }
    } else {
        println!("\x1b[38;5;226mWARN\x1b[0m - Using defaults (run: consentry config init)");
        warnings += 1;
        Some(AgentConfig::default())
    };

    print!("[2/4] Records file:   ");
    std::io::stdout().flush().unwrap();
    match config.as_ref() {
        Some(config) if config.store.records_path.exists() => {
            println!("\x1b[38;5;46mOK\x1b[0m ({:?})", config.store.records_path);
            passed += 1;
        }
        Some(config) => {
            println!(
                "\x1b[38;5;196mFAIL\x1b[0m - Not found: {:?}",
                config.store.records_path
            );
            failed += 1;
        }
        None => {
            println!("\x1b[38;5;245mSKIP\x1b[0m");
        }
    }

    print!("[3/4] Credential:     ");
    std::io::stdout().flush().unwrap();
    match config.as_ref() {
        Some(config) => match SenderCredential::load(&config.ledger) {
            Ok(_) => {
                println!("\x1b[38;5;46mOK\x1b[0m");
                passed += 1;
            }
            Err(e) => {
                println!("\x1b[38;5;196mFAIL\x1b[0m - {}", e);
                failed += 1;
            }
        },
        None => {
            println!("\x1b[38;5;245mSKIP\x1b[0m");
        }
    }

    print!("[4/4] Ledger RPC:     ");
    std::io::stdout().flush().unwrap();
    match config.as_ref() {
        Some(config) => {
            if probe_rpc(&config.ledger.rpc_url).await {
                println!("\x1b[38;5;46mOK\x1b[0m ({})", config.ledger.rpc_url);
                passed += 1;
            } else {
                println!(
                    "\x1b[38;5;196mFAIL\x1b[0m - Unreachable: {}",
                    config.ledger.rpc_url
                );
                failed += 1;
            }
        }
        None => {
            println!("\x1b[38;5;245mSKIP\x1b[0m");
        }
    }

    println!();
    println!(
        "{} passed, {} failed, {} warnings",
        passed, failed, warnings
    );

    if failed > 0 {
        return Err(AgentError::Config(format!(
            "{} preflight check(s) failed",
            failed
        )));
    }
    Ok(())
}

async fn probe_rpc(url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "eth_chainId",
        "params": [],
        "id": 1
    });

    match client.post(url).json(&request).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}
