use serde_json::Value;

/// Looks up `path` in `json`. Object keys are separated by dots, list items
/// are addressed with `[n]`, e.g. `data.items[0].name`.
pub fn get_property<'a>(json: &'a Value, path: &str) -> Result<&'a Value, String> {
    let mut current = json;

    for segment in path.split('.') {
        let (key, mut indices) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };

        if !key.is_empty() {
            current = match current {
                Value::Object(map) => map
                    .get(key)
                    .ok_or_else(|| format!("key {:?} not found in {:?}", key, path))?,
                _ => return Err(format!("cannot read key {:?} of a non-object in {:?}", key, path)),
            };
        } else if indices.is_empty() {
            return Err(format!("empty segment in path {:?}", path));
        }

        while !indices.is_empty() {
            let close = indices
                .find(']')
                .ok_or_else(|| format!("unclosed '[' in path {:?}", path))?;
            let index: usize = indices[1..close]
                .trim()
                .parse()
                .map_err(|_| format!("invalid index {:?} in path {:?}", &indices[1..close], path))?;

            current = match current {
                Value::Array(items) => items
                    .get(index)
                    .ok_or_else(|| format!("index {} out of range in {:?}", index, path))?,
                _ => return Err(format!("cannot index a non-list with [{}] in {:?}", index, path)),
            };

            indices = &indices[close + 1..];
            if !indices.is_empty() && !indices.starts_with('[') {
                return Err(format!("unexpected {:?} in path {:?}", indices, path));
            }
        }
    }

    Ok(current)
}
