use consentry_types::{AgentError, AgentResult};
use serde_json::Value;

/// Serialize a JSON value with recursively sorted object keys, so
/// semantically identical values always serialize to the same bytes
/// regardless of field order in the source document.
pub fn canonical_json(value: &Value) -> AgentResult<String> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> AgentResult<()> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&encode_scalar(&Value::String((*key).clone()))?);
                out.push(':');
                write_canonical(&map[*key], out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&encode_scalar(scalar)?),
    }
    Ok(())
}

fn encode_scalar(value: &Value) -> AgentResult<String> {
    serde_json::to_string(value).map_err(|e| AgentError::Serialization(e.to_string()))
}
