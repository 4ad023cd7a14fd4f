use crate::collection::{Collection, Document};
use crate::common::{Data, Value};
use crate::errors::LiveDocResult;
use crate::index::{has_wildcard, split_path};
use crate::populate::PopulationNode;
use std::collections::HashSet;

/// Applies parsed population nodes to copies of `documents`.
///
/// The input documents are never modified. Every node is applied to every
/// copy in declaration order, depth first. Ids that name no document of the
/// target collection stay in place. With `filter_unlisted` every level keeps
/// only the fields its node list names.
pub fn populate(nodes: &[PopulationNode], documents: &[Document], filter_unlisted: bool) -> LiveDocResult<Vec<Document>> {
    let copies: Vec<Document> = documents.iter().map(Document::ghost).collect();

    for copy in &copies {
        for node in nodes {
            apply(node, copy, filter_unlisted)?;
        }

        if filter_unlisted {
            retain_listed(copy, nodes)?;
        }
    }
    Ok(copies)
}

fn apply(node: &PopulationNode, document: &Document, filter_unlisted: bool) -> LiveDocResult<()> {
    let Some(target) = node.target() else {
        return Ok(());
    };

    if has_wildcard(node.key()) {
        log::warn!("Cannot populate wildcard path {}, leaving it untouched", node.key());
        return Ok(());
    }

    let Some(current) = document.get(node.key()).filter(|value| !value.is_null()) else {
        log::trace!("Nothing to populate at {} of document {}", node.key(), document.id());
        return Ok(());
    };

    let populated = match node.children() {
        Some(children) => expand(target, children, current, node.is_array(), filter_unlisted)?,
        None => substitute(target, current, node.is_array()),
    };

    if let Some(value) = populated {
        document.set(node.key(), value)?;
    }
    Ok(())
}

/// Replaces ids by copies of the documents they name.
fn substitute(target: &Collection, current: Value, is_array: bool) -> Option<Value> {
    match current {
        Value::Array(ids) => Some(Value::Array(
            ids.into_iter().map(|id| lookup(target, &id).unwrap_or(id)).collect(),
        )),
        id if is_array => Some(Value::Array(vec![lookup(target, &id).unwrap_or(id)])),
        id => lookup(target, &id),
    }
}

fn lookup(target: &Collection, id: &Value) -> Option<Value> {
    let id = id.as_id()?;
    target.by_id(&id).map(|doc| Value::Document(doc.ghost()))
}

/// Replaces ids by the documents they name, populated with `children`.
fn expand(
    target: &Collection,
    children: &[PopulationNode],
    current: Value,
    is_array: bool,
    filter_unlisted: bool,
) -> LiveDocResult<Option<Value>> {
    let (ids, single) = match current {
        Value::Array(ids) => (ids, false),
        id if is_array => (vec![id], false),
        id => (vec![id], true),
    };

    let found: Vec<Option<Document>> = ids
        .iter()
        .map(|id| id.as_id().and_then(|id| target.by_id(&id)))
        .collect();
    let referenced: Vec<Document> = found.iter().flatten().cloned().collect();
    let mut populated = populate(children, &referenced, filter_unlisted)?.into_iter();

    if single {
        return Ok(populated.next().map(Value::Document));
    }

    let values = ids
        .into_iter()
        .zip(found)
        .map(|(id, doc)| match doc {
            Some(_) => populated.next().map(Value::Document).unwrap_or(id),
            None => id,
        })
        .collect();
    Ok(Some(Value::Array(values)))
}

fn retain_listed(document: &Document, nodes: &[PopulationNode]) -> LiveDocResult<()> {
    let listed: HashSet<&str> = nodes
        .iter()
        .filter_map(|node| split_path(node.key()).first().copied())
        .collect();

    let data = document.data();
    if data.keys().all(|key| listed.contains(key.as_str())) {
        return Ok(());
    }

    let kept: Data = data
        .into_iter()
        .filter(|(key, _)| listed.contains(key.as_str()))
        .collect();
    document.set_data(kept)
}
