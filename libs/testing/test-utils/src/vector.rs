//! In-memory vector backend
//!
//! `InMemoryVectorStore` implements `VectorBackend` with brute-force L2
//! search. It understands the filter expressions the executor generates
//! (`field == literal` joined by `&&`, and `id in [...]`), which is enough to
//! exercise search and delete end to end.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use domain_storage::vector::{
    DeleteRequest, ID_FIELD, SearchHit, SearchRequest, VectorBackend, WriteRequest,
};
use domain_storage::{Fields, StorageError, StorageResult, TypedValue};

/// A stored entity
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntity {
    pub partition: Option<String>,
    pub vector: Vec<f32>,
    pub fields: Fields,
}

#[derive(Debug, Default)]
struct Collection {
    partitions: BTreeSet<String>,
    loaded: bool,
    entities: BTreeMap<String, StoredEntity>,
    flushes: usize,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Collection>,
    /// backend method name to the error it should return
    failures: HashMap<String, String>,
    omit_delete_counts: bool,
}

/// A fake Milvus. Clones share state.
///
/// # Example
///
/// ```
/// use test_utils::InMemoryVectorStore;
///
/// let store = InMemoryVectorStore::new().with_collection("memory_vectors");
/// assert!(store.has("memory_vectors"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("vector store state poisoned")
    }

    /// Adds an empty, unloaded collection.
    pub fn with_collection(self, name: &str) -> Self {
        self.lock()
            .collections
            .insert(name.to_string(), Collection::default());
        self
    }

    /// Makes the named backend method (`insert`, `search`, `flush`, ...) fail.
    pub fn fail(self, method: &str, message: &str) -> Self {
        self.lock()
            .failures
            .insert(method.to_string(), message.to_string());
        self
    }

    /// Delete responses carry no count, like older Milvus versions.
    pub fn without_delete_counts(self) -> Self {
        self.lock().omit_delete_counts = true;
        self
    }

    pub fn has(&self, collection: &str) -> bool {
        self.lock().collections.contains_key(collection)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map_or(0, |c| c.entities.len())
    }

    pub fn entity(&self, collection: &str, id: &str) -> Option<StoredEntity> {
        self.lock()
            .collections
            .get(collection)
            .and_then(|c| c.entities.get(id).cloned())
    }

    pub fn partitions(&self, collection: &str) -> Vec<String> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.partitions.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_loaded(&self, collection: &str) -> bool {
        self.lock()
            .collections
            .get(collection)
            .is_some_and(|c| c.loaded)
    }

    pub fn flushes(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map_or(0, |c| c.flushes)
    }

    /// Runs `f` on the collection after checking for a scripted failure.
    fn with<T>(
        &self,
        method: &str,
        collection: &str,
        f: impl FnOnce(&mut Collection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut state = self.lock();
        if let Some(message) = state.failures.get(method) {
            return Err(StorageError::Execution(message.clone()));
        }
        let coll = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StorageError::Milvus {
                code: 100,
                message: format!("collection not found[collection={}]", collection),
            })?;
        f(coll)
    }

    fn write(&self, method: &str, request: WriteRequest) -> StorageResult<u64> {
        let partition = request.partition.clone();
        self.with(method, &request.collection, |coll| {
            if let Some(p) = &partition {
                if !coll.partitions.contains(p) {
                    return Err(StorageError::Milvus {
                        code: 200,
                        message: format!("partition not found[partition={}]", p),
                    });
                }
            }
            let columns = &request.columns;
            for (row, id) in columns.ids.iter().enumerate() {
                let fields = columns
                    .fields
                    .iter()
                    .map(|c| (c.name.clone(), c.data.value_at(row)))
                    .collect();
                coll.entities.insert(
                    id.clone(),
                    StoredEntity {
                        partition: partition.clone(),
                        vector: columns.embeddings[row].clone(),
                        fields,
                    },
                );
            }
            Ok(columns.len() as u64)
        })
    }
}

#[async_trait]
impl VectorBackend for InMemoryVectorStore {
    async fn has_collection(&self, collection: &str) -> StorageResult<bool> {
        let state = self.lock();
        if let Some(message) = state.failures.get("has_collection") {
            return Err(StorageError::Execution(message.clone()));
        }
        Ok(state.collections.contains_key(collection))
    }

    async fn has_partition(&self, collection: &str, partition: &str) -> StorageResult<bool> {
        self.with("has_partition", collection, |c| {
            Ok(c.partitions.contains(partition))
        })
    }

    async fn create_partition(&self, collection: &str, partition: &str) -> StorageResult<()> {
        self.with("create_partition", collection, |c| {
            c.partitions.insert(partition.to_string());
            Ok(())
        })
    }

    async fn ensure_loaded(&self, collection: &str) -> StorageResult<()> {
        self.with("ensure_loaded", collection, |c| {
            c.loaded = true;
            Ok(())
        })
    }

    async fn insert(&self, request: WriteRequest) -> StorageResult<u64> {
        self.write("insert", request)
    }

    async fn upsert(&self, request: WriteRequest) -> StorageResult<u64> {
        self.write("upsert", request)
    }

    async fn search(&self, request: SearchRequest) -> StorageResult<Vec<SearchHit>> {
        let filter = Filter::parse(&request.filter)?;
        self.with("search", &request.collection, |coll| {
            let all_fields = request.output_fields.iter().any(|f| f == "*");
            let mut hits: Vec<SearchHit> = coll
                .entities
                .iter()
                .filter(|(_, e)| request.partition.is_none() || e.partition == request.partition)
                .filter(|(id, e)| filter.matches(id, &e.fields))
                .map(|(id, e)| {
                    let mut fields: Fields = e
                        .fields
                        .iter()
                        .filter(|(name, _)| all_fields || request.output_fields.contains(name))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    fields.insert(ID_FIELD.to_string(), TypedValue::from(id.as_str()));
                    SearchHit {
                        id: id.clone(),
                        score: squared_l2(&request.vector, &e.vector),
                        fields,
                    }
                })
                .collect();
            hits.sort_by(|a, b| a.score.total_cmp(&b.score));
            hits.truncate(request.top_k);
            Ok(hits)
        })
    }

    async fn delete(&self, request: DeleteRequest) -> StorageResult<Option<u64>> {
        let filter = Filter::parse(&request.filter)?;
        let omit_count = self.lock().omit_delete_counts;
        self.with("delete", &request.collection, |coll| {
            let doomed: Vec<String> = coll
                .entities
                .iter()
                .filter(|(_, e)| request.partition.is_none() || e.partition == request.partition)
                .filter(|(id, e)| filter.matches(id, &e.fields))
                .map(|(id, _)| id.clone())
                .collect();
            for id in &doomed {
                coll.entities.remove(id);
            }
            Ok((!omit_count).then_some(doomed.len() as u64))
        })
    }

    async fn flush(&self, collection: &str) -> StorageResult<()> {
        self.with("flush", collection, |c| {
            c.flushes += 1;
            Ok(())
        })
    }
}

/// The metric Milvus reports for L2 collections.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[derive(Debug)]
enum Clause {
    Eq(String, String),
    IdIn(Vec<String>),
}

/// Conjunction of clauses; empty matches everything.
#[derive(Debug)]
struct Filter(Vec<Clause>);

impl Filter {
    fn parse(expr: &str) -> StorageResult<Self> {
        if expr.trim().is_empty() {
            return Ok(Filter(Vec::new()));
        }
        expr.split(" && ").map(parse_clause).collect::<StorageResult<_>>().map(Filter)
    }

    fn matches(&self, id: &str, fields: &Fields) -> bool {
        self.0.iter().all(|clause| match clause {
            Clause::IdIn(ids) => ids.iter().any(|i| i == id),
            Clause::Eq(name, literal) if name == ID_FIELD => id == literal,
            Clause::Eq(name, literal) => fields
                .get(name)
                .is_some_and(|v| &v.as_string() == literal),
        })
    }
}

fn parse_clause(clause: &str) -> StorageResult<Clause> {
    let bad = || StorageError::Milvus {
        code: 1100,
        message: format!("cannot parse expression: {}", clause),
    };
    let clause = clause.trim();

    if let Some(list) = clause.strip_prefix(&format!("{} in ", ID_FIELD)) {
        let inner = list
            .strip_prefix('[')
            .and_then(|l| l.strip_suffix(']'))
            .ok_or_else(bad)?;
        let ids = split_quoted(inner).ok_or_else(bad)?;
        return Ok(Clause::IdIn(ids));
    }

    let (name, literal) = clause.split_once(" == ").ok_or_else(bad)?;
    let literal = literal.trim();
    let value = if literal.starts_with('"') {
        let mut values = split_quoted(literal).ok_or_else(bad)?;
        if values.len() != 1 {
            return Err(bad());
        }
        values.remove(0)
    } else {
        literal.to_string()
    };
    Ok(Clause::Eq(name.trim().to_string(), value))
}

/// Parses `"a","b\"c"` into its unescaped strings.
fn split_quoted(input: &str) -> Option<Vec<String>> {
    let mut out = Vec::new();
    let mut chars = input.trim().chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                let mut current = String::new();
                loop {
                    match chars.next()? {
                        '\\' => current.push(chars.next()?),
                        '"' => break,
                        other => current.push(other),
                    }
                }
                out.push(current);
            }
            ',' | ' ' => continue,
            _ => return None,
        }
    }
    Some(out)
}
