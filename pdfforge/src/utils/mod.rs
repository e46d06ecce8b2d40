//! Utilities for path collection and lopdf object-graph helpers.

use crate::{PdfForgeError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::PathBuf;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Page trees nested deeper than this are treated as cyclic.
const MAX_TREE_DEPTH: usize = 64;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`. A pattern without wildcards
/// that names no existing file is kept as-is, so the caller reports it as
/// missing instead of silently dropping it.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let pattern = pattern.as_ref();
        let paths = collect_paths_for_pattern(pattern)?;
        if paths.is_empty() && !has_wildcards(pattern) {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand a single glob pattern, in sorted order.
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| PdfForgeError::other(err.to_string()))?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| PdfForgeError::other(err.to_string()))?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

/// Copy everything `obj` references from `source` into `target`.
///
/// Walks the object graph recursively and inserts each referenced object not
/// yet present in `target` under its source id. Page and page-tree nodes are
/// not followed: copying one page must not drag its siblings along (through
/// `/Parent` or annotation back-links).
pub fn copy_references(target: &mut Document, source: &Document, obj: &Object) {
    match obj {
        Object::Reference(ref_id) => {
            if !target.objects.contains_key(ref_id)
                && let Ok(referenced_obj) = source.get_object(*ref_id)
                && !is_page_node(referenced_obj)
            {
                target.objects.insert(*ref_id, referenced_obj.clone());
                copy_references(target, source, referenced_obj);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                copy_references(target, source, value);
            }
        }
        Object::Array(arr) => {
            for item in arr {
                copy_references(target, source, item);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                copy_references(target, source, value);
            }
        }
        _ => {}
    }
}

fn is_page_node(obj: &Object) -> bool {
    let dict = match obj {
        Object::Dictionary(dict) => dict,
        _ => return false,
    };
    dict.get(b"Type")
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Page" || name == b"Pages")
}

/// Look up `key` on a page, falling back to its ancestors.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Follow a reference to the object it names; other objects are returned
/// unchanged.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Width and height of a page's media box in points, with `/Rotate` applied.
///
/// Falls back to US Letter when the box is missing or malformed.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    const LETTER: (f32, f32) = (612.0, 792.0);

    let (width, height) = inherited_attribute(doc, page_id, b"MediaBox")
        .as_ref()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .and_then(|arr| rect_size(doc, arr))
        .unwrap_or(LETTER);

    let rotate = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);

    if rotate.rem_euclid(180) == 90 {
        (height, width)
    } else {
        (width, height)
    }
}

fn rect_size(doc: &Document, rect: &[Object]) -> Option<(f32, f32)> {
    if rect.len() != 4 {
        return None;
    }
    let mut coords = [0f32; 4];
    for (slot, obj) in coords.iter_mut().zip(rect) {
        *slot = resolve(doc, obj)?.as_float().ok()?;
    }
    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    (width > 0.0 && height > 0.0).then_some((width, height))
}

/// Remove the keys a detached page must not carry.
pub fn detach_page(dict: &mut Dictionary) {
    dict.remove(b"Parent");
}
