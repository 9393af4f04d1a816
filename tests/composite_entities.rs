use rust_sqlite_orm::{
    CompositeEntity, Entity, Mapped, OrmConfig, OrmError, Registry, Result, SqliteStore, Value,
};

const CONFIG: &str = r#"{
    "sqlite": { "db_path": ":memory:" },
    "entities": [
        { "name": "Person", "table": "people", "primary_key": ["id"], "attributes": ["id", "name"] },
        { "name": "Group", "table": "groups", "primary_key": ["id"], "attributes": ["id", "title"] }
    ],
    "composites": [
        { "name": "Membership", "table": "memberships",
          "primary_key": ["person_id", "group_id"], "attributes": ["role"],
          "references": [
            { "name": "person", "kind": "Person", "foreign_keys": { "id": "person_id" } },
            { "name": "group", "kind": "Group", "foreign_keys": { "id": "group_id" } }
          ] }
    ]
}"#;

fn setup() -> Result<(SqliteStore, Registry)> {
    let config = OrmConfig::from_json_str(CONFIG)?;
    let registry = Registry::from_config(&config)?;
    let mut store = SqliteStore::open(&config.sqlite)?;
    store.connection().execute_batch(
        r#"
        CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT);
        CREATE TABLE groups (id INTEGER PRIMARY KEY, title TEXT);
        CREATE TABLE memberships (
            person_id INTEGER REFERENCES people(id),
            group_id INTEGER REFERENCES groups(id),
            role TEXT,
            PRIMARY KEY (person_id, group_id)
        );
        "#,
    )?;

    let person = registry.entity("Person")?;
    let group = registry.entity("Group")?;
    for (id, name) in [(1, "Ann"), (2, "Bob")] {
        Entity::new(person.clone(), [("id", Value::from(id)), ("name", Value::from(name))])
            .insert(&mut store)?;
    }
    for (id, title) in [(9, "admins"), (4, "readers")] {
        Entity::new(group.clone(), [("id", Value::from(id)), ("title", Value::from(title))])
            .insert(&mut store)?;
    }
    Ok((store, registry))
}

fn membership(registry: &Registry, person: i64, group: i64, role: Option<&str>) -> Result<CompositeEntity> {
    CompositeEntity::new(
        registry.composite("Membership")?,
        [
            ("person", Entity::new(registry.entity("Person")?, [("id", person)])),
            ("group", Entity::new(registry.entity("Group")?, [("id", group)])),
        ],
        [("role", Value::from(role))],
    )
}

#[test]
fn composite_round_trip_through_storage() -> Result<()> {
    let (mut store, registry) = setup()?;
    let m = membership(&registry, 1, 9, Some("owner"))?;
    m.insert(&mut store)?;

    let found = m.lookup(&mut store)?;
    assert_eq!(found.rows.len(), 1);
    let decoded = CompositeEntity::from_db_entry(
        registry.composite("Membership")?,
        &found.columns,
        &found.rows[0],
    )?
    .unwrap();
    assert_eq!(decoded.to_dict(), m.to_dict());
    assert_eq!(
        decoded.reference("person"),
        Some(&Entity::new(registry.entity("Person")?, [("id", 1)]))
    );
    assert_eq!(decoded.to_string(), "Membership(person_id: 1, group_id: 9, role: owner)");
    Ok(())
}

#[test]
fn referenced_elements_are_fetched_from_their_tables() -> Result<()> {
    let (mut store, registry) = setup()?;
    let m = membership(&registry, 2, 4, None)?;

    let person = m.referenced_element("person", &mut store)?.unwrap();
    assert_eq!(person.value("name"), &Value::from("Bob"));
    let group = m.referenced_element("group", &mut store)?.unwrap();
    assert_eq!(group.value("title"), &Value::from("readers"));

    let dangling = membership(&registry, 3, 4, None)?;
    assert!(dangling.referenced_element("person", &mut store)?.is_none());
    assert!(matches!(
        m.referenced_element("owner", &mut store),
        Err(OrmError::UnknownReference { .. })
    ));
    Ok(())
}

#[test]
fn lookup_for_elements_finds_siblings() -> Result<()> {
    let (mut store, registry) = setup()?;
    membership(&registry, 1, 9, Some("owner"))?.insert(&mut store)?;
    membership(&registry, 1, 4, None)?.insert(&mut store)?;
    membership(&registry, 2, 4, Some("member"))?.insert(&mut store)?;

    let probe = membership(&registry, 1, 4, None)?;
    let anns = probe.lookup_for_elements(&["person"], &mut store)?;
    assert_eq!(anns.len(), 2);
    assert!(anns
        .iter()
        .all(|m| m.value("person_id") == &Value::Integer(1)));

    let readers = probe.lookup_for_elements(&["group"], &mut store)?;
    assert_eq!(readers.len(), 2);

    let exact = probe.lookup_for_elements(&["person", "group"], &mut store)?;
    assert_eq!(exact, [probe.clone()]);
    Ok(())
}

#[test]
fn composite_update_and_delete() -> Result<()> {
    let (mut store, registry) = setup()?;
    let m = membership(&registry, 1, 9, Some("owner"))?;
    m.insert(&mut store)?;

    let moved = membership(&registry, 2, 9, Some("owner"))?;
    let result = m.update(&moved, &mut store)?;
    assert_eq!(result.rows_affected, 1);
    assert!(m.lookup(&mut store)?.is_empty());
    assert_eq!(moved.lookup(&mut store)?.rows.len(), 1);

    moved.delete(&mut store)?;
    assert!(moved.lookup(&mut store)?.is_empty());
    Ok(())
}
