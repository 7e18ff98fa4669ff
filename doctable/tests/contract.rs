//! Behaviour every storage backend must share, run against each of them.

use doctable::{
    memory::InMemoryStore,
    prelude::*,
    serde_json::{Value, json},
    sqlite::SqliteStore,
};
use std::path::Path;

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn registry() -> TableRegistry {
    TableRegistry::new([("issues", "issues"), ("rules", "rules"), ("items", "items")])
}

fn memory_store() -> DocumentStore<InMemoryStore> {
    DocumentStore::new(InMemoryStore::with_registry(registry()))
}

fn sqlite_store(dir: &Path) -> DocumentStore<SqliteStore> {
    DocumentStore::new(
        SqliteStore::builder(dir.join("contract.db"))
            .registry(registry())
            .build()
            .unwrap(),
    )
}

macro_rules! contract {
    ($($case:ident),* $(,)?) => {
        mod memory {
            $(
                #[test]
                fn $case() {
                    super::$case(super::memory_store());
                }
            )*
        }

        mod sqlite {
            $(
                #[test]
                fn $case() {
                    let dir = tempfile::tempdir().unwrap();
                    super::$case(super::sqlite_store(dir.path()));
                }
            )*
        }
    };
}

contract!(
    conjunctive_equality,
    nested_fields,
    empty_query_returns_everything,
    unknown_collections_are_rejected,
    bulk_insert,
    hostile_values,
    malformed_field_paths,
    composite_query_values,
    typed_equality,
    missing_fields_never_match,
    numbers_at_the_edges,
    over_deep_documents_are_refused,
    close_is_idempotent,
);

fn conjunctive_equality<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    let a30 = doc(json!({ "name": "a", "age": 30 }));
    let b30 = doc(json!({ "name": "b", "age": 30 }));
    let a40 = doc(json!({ "name": "a", "age": 40 }));

    for d in [&a30, &b30, &a40] {
        items.add(d).unwrap();
    }

    assert_eq!(items.find(&Query::new().eq("name", "a")).unwrap(), vec![a30.clone(), a40]);
    assert_eq!(items.find(&Query::new().eq("name", "a").eq("age", 30)).unwrap(), vec![a30]);
    assert_eq!(items.find(&Query::new().eq("age", 30).eq("name", "b")).unwrap(), vec![b30]);
    assert!(items.find(&Query::new().eq("name", "c")).unwrap().is_empty());
}

fn nested_fields<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    let x = doc(json!({ "address": { "city": "X", "zip": "1000" } }));
    items.add(&x).unwrap();
    items.add(&doc(json!({ "address": { "city": "Y" } }))).unwrap();
    items.add(&doc(json!({ "address": "X" }))).unwrap();

    assert_eq!(items.find(&Query::new().eq("address.city", "X")).unwrap(), vec![x.clone()]);
    assert_eq!(
        items.find(&Query::new().eq("address.city", "X").eq("address.zip", "1000")).unwrap(),
        vec![x]
    );
}

fn empty_query_returns_everything<B: StoreBackend>(store: DocumentStore<B>) {
    let rules = store.collection("rules");
    let docs = vec![doc(json!({ "n": 1 })), doc(json!({ "n": 2 })), doc(json!({}))];
    rules.add_all(&docs).unwrap();

    assert_eq!(rules.find(&Query::new()).unwrap(), docs);
    assert_eq!(rules.all().unwrap(), docs);
}

fn unknown_collections_are_rejected<B: StoreBackend>(store: DocumentStore<B>) {
    let bogus = store.collection("bogus");

    assert!(matches!(bogus.add(&Document::new()), Err(DocumentStoreError::UnknownCollection(_))));
    assert!(matches!(bogus.add_all(&[Document::new()]), Err(DocumentStoreError::UnknownCollection(_))));
    assert!(matches!(bogus.all(), Err(DocumentStoreError::UnknownCollection(_))));
    assert!(matches!(bogus.find(&Query::new()), Err(DocumentStoreError::UnknownCollection(_))));

    for name in store.registry().names() {
        assert!(store.collection(name).all().unwrap().is_empty());
    }
}

fn bulk_insert<B: StoreBackend>(store: DocumentStore<B>) {
    let issues = store.collection("issues");
    let docs = (0..50)
        .map(|i| doc(json!({ "issue_id": i.to_string(), "open": i % 2 == 0 })))
        .collect::<Vec<_>>();

    issues.add_all(&[]).unwrap();
    issues.add_all(&docs).unwrap();

    assert_eq!(issues.all().unwrap(), docs);
    assert_eq!(issues.find(&Query::new().eq("open", true)).unwrap().len(), 25);
    assert!(store.collection("rules").all().unwrap().is_empty());
}

fn hostile_values<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    let hostile = "'; DROP TABLE items; --";
    let d = doc(json!({ "name": hostile }));
    items.add(&d).unwrap();
    items.add(&doc(json!({ "name": "plain" }))).unwrap();

    assert_eq!(items.find(&Query::new().eq("name", hostile)).unwrap(), vec![d]);
    assert!(items.find(&Query::new().eq("name", "x' OR '1'='1")).unwrap().is_empty());
    assert_eq!(items.all().unwrap().len(), 2);
}

fn malformed_field_paths<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    items.add(&doc(json!({ "a": { "b": 1 } }))).unwrap();

    for path in ["", "a..b", ".a", "a.", "a b", "a[0]", "name') OR 1=1 --"] {
        assert!(
            matches!(items.find(&Query::new().eq(path, 1)), Err(DocumentStoreError::InvalidFieldPath(_))),
            "{path:?} should be rejected"
        );
    }
}

fn composite_query_values<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    items.add(&doc(json!({ "tags": ["x"] }))).unwrap();

    assert!(matches!(
        items.find(&Query::new().eq("tags", json!(["x"]))),
        Err(DocumentStoreError::InvalidQueryValue(..))
    ));
    assert!(matches!(
        items.find(&Query::new().eq("meta", json!({ "k": 1 }))),
        Err(DocumentStoreError::InvalidQueryValue(..))
    ));
}

fn typed_equality<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    let docs = [
        doc(json!({ "k": 5 })),
        doc(json!({ "k": "5" })),
        doc(json!({ "k": 5.0 })),
        doc(json!({ "k": true })),
        doc(json!({ "k": 1 })),
        doc(json!({ "k": 0 })),
        doc(json!({ "k": false })),
    ];
    items.add_all(&docs).unwrap();

    let find = |value: Value| items.find(&Query::new().eq("k", value)).unwrap();

    assert_eq!(find(json!(5)), vec![docs[0].clone(), docs[2].clone()]);
    assert_eq!(find(json!("5")), vec![docs[1].clone()]);
    assert_eq!(find(json!(true)), vec![docs[3].clone()]);
    assert_eq!(find(json!(1)), vec![docs[4].clone()]);
    assert_eq!(find(json!(false)), vec![docs[6].clone()]);
    assert_eq!(find(json!(0)), vec![docs[5].clone()]);
}

fn missing_fields_never_match<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    let explicit = doc(json!({ "assignee": null }));
    items.add(&explicit).unwrap();
    items.add(&doc(json!({ "title": "unassigned" }))).unwrap();

    assert_eq!(items.find(&Query::new().eq("assignee", Value::Null)).unwrap(), vec![explicit]);
    assert!(items.find(&Query::new().eq("assignee.name", Value::Null)).unwrap().is_empty());
}

fn numbers_at_the_edges<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    let big = doc(json!({ "k": u64::MAX }));
    let above = doc(json!({ "k": 9_007_199_254_740_993_i64 }));
    let at = doc(json!({ "k": 9_007_199_254_740_992_i64 }));
    let max = doc(json!({ "k": i64::MAX }));
    items.add_all(&[big.clone(), above.clone(), at.clone(), max.clone()]).unwrap();

    let find = |value: Value| items.find(&Query::new().eq("k", value)).unwrap();

    // Integers beyond i64 are compared as reals.
    assert_eq!(find(json!(u64::MAX)), vec![big.clone()]);
    assert_eq!(find(json!(u64::MAX - 1)), vec![big]);
    // Integer against real is exact.
    assert_eq!(find(json!(9_007_199_254_740_992.0)), vec![at.clone()]);
    assert_eq!(find(json!(9_007_199_254_740_993_i64)), vec![above]);
    assert_eq!(find(json!(9_007_199_254_740_992_i64)), vec![at]);
    assert_eq!(find(json!(i64::MAX)), vec![max]);
}

fn over_deep_documents_are_refused<B: StoreBackend>(store: DocumentStore<B>) {
    let items = store.collection("items");
    let mut value = json!("leaf");
    for _ in 0..200 {
        value = json!({ "n": value });
    }
    let deep = value.as_object().cloned().unwrap();
    let shallow = doc(json!({ "n": { "n": 1 } }));

    items.add(&shallow).unwrap();
    assert!(matches!(items.add(&deep), Err(DocumentStoreError::InvalidDocument(_))));
    assert!(matches!(
        items.add_all(&[shallow.clone(), deep]),
        Err(DocumentStoreError::InvalidDocument(_))
    ));

    assert_eq!(items.all().unwrap(), vec![shallow]);
}

fn close_is_idempotent<B: StoreBackend>(store: DocumentStore<B>) {
    store.collection("issues").add(&doc(json!({ "issue_id": "1" }))).unwrap();

    store.close().unwrap();
    store.close().unwrap();

    assert!(matches!(store.collection("issues").all(), Err(DocumentStoreError::StorageUnavailable(_))));
    assert!(matches!(
        store.collection("issues").find(&Query::new()),
        Err(DocumentStoreError::StorageUnavailable(_))
    ));
}
