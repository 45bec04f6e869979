//! Containers recorded in the state store

use crate::engine::executor::ContainerInfo;
use crate::error::Result;
use crate::state::StateStore;

/// Every record of the store, sorted by container name
pub fn query_status(store: &StateStore) -> Result<Vec<ContainerInfo>> {
    Ok(store
        .records()?
        .into_iter()
        .map(|(name, record)| ContainerInfo {
            name,
            id: record.id,
            address: record.address,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RuntimeRecord;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::in_dir(temp_dir.path());
        store.ensure_exists().unwrap();
        assert!(query_status(&store).unwrap().is_empty());
    }

    #[test]
    fn test_records_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::in_dir(temp_dir.path());
        let mut records = BTreeMap::new();
        records.insert("web".to_string(), RuntimeRecord::new("w1", "172.17.0.3"));
        records.insert("db".to_string(), RuntimeRecord::foreground("d1"));
        store.upsert(&records).unwrap();

        let containers = query_status(&store).unwrap();
        let names: Vec<&str> = containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["db", "web"]);
        assert_eq!(containers[1].address, "172.17.0.3");
    }
}
