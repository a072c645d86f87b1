#![allow(dead_code)]

use reportmodel_core::{CompiledModel, ModelValue, StringTable};
use serde_json::{json, Value};

/// Replace string ids with their text so models can be compared by value.
pub fn remap(model: &ModelValue, strings: &[String]) -> Value {
    let table = StringTable::new(strings);
    remap_with(model, &table)
}

fn remap_with(model: &ModelValue, table: &StringTable<'_>) -> Value {
    match model {
        ModelValue::Null => Value::Null,
        ModelValue::Int(v) => json!(v),
        ModelValue::Text(index) => json!(table.resolve(*index).expect("string id in range")),
        ModelValue::Tuple(items) => {
            Value::Array(items.iter().map(|item| remap_with(item, table)).collect())
        }
    }
}

/// Remapped root model with every chunk placeholder replaced by the
/// remapped chunk it refers to.
pub fn expand(compiled: &CompiledModel) -> Value {
    let mut root = remap(&compiled.root_model, &compiled.root_strings);
    expand_suite(&mut root, compiled);
    root
}

fn expand_suite(suite: &mut Value, compiled: &CompiledModel) {
    for child in suite[6].as_array_mut().expect("suites").iter_mut() {
        expand_suite(child, compiled);
    }
    for test in suite[7].as_array_mut().expect("tests").iter_mut() {
        resolve_placeholder(&mut test[6], compiled);
    }
    for kw in suite[8].as_array_mut().expect("keywords").iter_mut() {
        resolve_placeholder(&mut kw[6], compiled);
    }
}

fn resolve_placeholder(slot: &mut Value, compiled: &CompiledModel) {
    if let Some(placeholder) = slot.as_i64() {
        let chunk = compiled.chunk(placeholder).expect("placeholder refers to a chunk");
        *slot = remap(&chunk.model, &chunk.strings);
    }
}

/// Placeholders found in test and suite-keyword slots, in document order.
pub fn placeholders(model: &Value) -> Vec<i64> {
    let mut found = Vec::new();
    collect_placeholders(model, &mut found);
    found
}

fn collect_placeholders(suite: &Value, found: &mut Vec<i64>) {
    for child in suite[6].as_array().expect("suites") {
        collect_placeholders(child, found);
    }
    for test in suite[7].as_array().expect("tests") {
        found.extend(test[6].as_i64());
    }
    for kw in suite[8].as_array().expect("keywords") {
        found.extend(kw[6].as_i64());
    }
}
