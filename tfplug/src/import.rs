//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Sets the import ID to a specific string attribute in state
///
/// Example: ID "config" -> state.id = "config"
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    import_value(
        attr_path,
        Dynamic::String(request.id.clone()),
        request,
        response,
    );
}

/// Parses the import ID as an integer and stores it as a number
///
/// Example: ID "12" -> state.id = 12
pub fn import_state_passthrough_int_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    match request.id.trim().parse::<i64>() {
        Ok(id) => import_value(attr_path, Dynamic::from(id), request, response),
        Err(_) => response.diagnostics.push(
            Diagnostic::error(
                "Unexpected Import Identifier",
                format!(
                    "Expected import identifier with format: ID. Got: {:?}",
                    request.id
                ),
            )
            .with_attribute(attr_path),
        ),
    }
}

fn import_value(
    attr_path: AttributePath,
    value: Dynamic,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let mut state = DynamicValue::object();

    if let Err(e) = state.set_value(&attr_path, value) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!("Could not set attribute '{}' to '{}'", attr_path, request.id),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}
