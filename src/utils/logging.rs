use tracing::{error, info, warn, debug};

/// Logs an inbound message with the principal's current conversation step
pub fn log_message_received(principal: &str, step: &str, text: &str) {
    info!("MSG_IN: from {} at step {} - {:?}", principal, step, text);
}

/// Logs a conversation step change
pub fn log_transition(principal: &str, from: &str, to: &str) {
    if from != to {
        debug!("TRANSITION: {} {} -> {}", principal, from, to);
    }
}

/// Logs a message dispatch that failed before a reply could be computed
pub fn log_handler_error(principal: &str, step: &str, error: &str) {
    error!("HANDLER_ERROR: from {} at step {} - {}", principal, step, error);
}

/// Logs an outbound message the channel refused or never received
pub fn log_delivery_failure(to: &str, error: &str) {
    warn!("DELIVERY_FAILED: to {} - {}", to, error);
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs the outcome of one reminder batch
pub fn log_reminder_batch(event_id: &str, recipients: usize, failures: usize) {
    info!(
        "REMINDER: event {} - {} recipients, {} delivery failures",
        event_id, recipients, failures
    );
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
