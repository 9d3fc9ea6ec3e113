#[cfg(test)]
mod index {
    use granary::persistence::{HashIndex, Value};

    #[test]
    fn index_insert_then_find() {
        let mut index = HashIndex::new();
        index.insert(Value::Int(7), 0);
        index.insert(Value::Text("ski".to_string()), 1);

        assert_eq!(index.find(&Value::Int(7)), Some(0));
        assert_eq!(index.find(&Value::Text("ski".to_string())), Some(1));
        assert_eq!(index.find(&Value::Int(8)), None);
    }

    #[test]
    fn index_insert_overwrites_on_equal_key() {
        let mut index = HashIndex::new();
        index.insert(Value::Int(1), 0);
        index.insert(Value::Int(1), 5);

        assert_eq!(index.find(&Value::Int(1)), Some(5));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn index_delete_reports_match() {
        let mut index = HashIndex::new();
        index.insert(Value::Int(1), 0);

        assert_eq!(index.delete(&Value::Int(1)), true);
        assert_eq!(index.delete(&Value::Int(1)), false);
        assert!(index.is_empty());
    }

    #[test]
    fn index_delete_patches_chain_at_any_position() {
        // A single bucket forces every key onto one chain.
        let mut index = HashIndex::with_bucket_count(1);
        index.insert(Value::Int(1), 0);
        index.insert(Value::Int(2), 1);
        index.insert(Value::Int(3), 2);

        // interior
        assert!(index.delete(&Value::Int(2)));
        assert_eq!(index.find(&Value::Int(1)), Some(0));
        assert_eq!(index.find(&Value::Int(3)), Some(2));

        // head
        assert!(index.delete(&Value::Int(1)));
        assert_eq!(index.find(&Value::Int(3)), Some(2));

        // tail (now the only node)
        assert!(index.delete(&Value::Int(3)));
        assert!(index.is_empty());
    }

    #[test]
    fn index_shift_back_closes_handle_gap() {
        let mut index = HashIndex::new();
        index.insert(Value::Int(1), 0);
        index.insert(Value::Int(2), 1);
        index.insert(Value::Int(3), 2);

        index.delete(&Value::Int(1));
        index.shift_back(0);

        assert_eq!(index.find(&Value::Int(2)), Some(0));
        assert_eq!(index.find(&Value::Int(3)), Some(1));
    }

    #[test]
    fn index_clear_removes_everything() {
        let mut index = HashIndex::with_bucket_count(4);
        for handle in 0..16 {
            index.insert(Value::Int(handle as i64), handle);
        }
        assert_eq!(index.len(), 16);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.find(&Value::Int(3)), None);
    }
}

#[cfg(test)]
mod table {
    use granary::errors::StoreError;
    use granary::persistence::{Field, FieldType, Row, Table, Value};
    use indexmap::IndexMap;

    fn _users_fields() -> Vec<Field> {
        vec![
            Field::new("id", FieldType::Int, true),
            Field::new("name", FieldType::String, false),
        ]
    }

    fn _users_table() -> Table {
        Table::new("users", _users_fields()).unwrap()
    }

    fn _row(pairs: Vec<(&str, Value)>) -> Row {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    fn _user(id: i64, name: &str) -> Row {
        _row(vec![
            ("id", Value::Int(id)),
            ("name", Value::Text(name.to_string())),
        ])
    }

    fn _updates(pairs: Vec<(&str, Value)>) -> IndexMap<String, Value> {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn table_requires_a_primary_key() {
        let fields = vec![Field::new("id", FieldType::Int, false)];
        let err = Table::new("users", fields).unwrap_err();
        assert!(matches!(err, StoreError::NoPrimaryKey(_)));
    }

    #[test]
    fn table_rejects_two_primary_keys() {
        let fields = vec![
            Field::new("id", FieldType::Int, true),
            Field::new("uuid", FieldType::String, true),
        ];
        let err = Table::new("users", fields).unwrap_err();
        assert!(matches!(err, StoreError::MultiplePrimaryKeys(_)));
    }

    #[test]
    fn table_rejects_duplicate_field_names() {
        let fields = vec![
            Field::new("id", FieldType::Int, true),
            Field::new("id", FieldType::String, false),
        ];
        let err = Table::new("users", fields).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateField(_)));
    }

    #[test]
    fn table_insert_missing_field_leaves_table_unchanged() {
        let mut table = _users_table();
        let err = table
            .insert(_row(vec![("id", Value::Int(1))]))
            .unwrap_err();

        assert!(matches!(err, StoreError::MissingField(_)));
        assert_eq!(table.len(), 0);
        assert!(table.find_row(&Value::Int(1)).is_none());
    }

    #[test]
    fn table_insert_rejects_undeclared_field() {
        let mut table = _users_table();
        let row = _row(vec![
            ("id", Value::Int(1)),
            ("name", Value::Text("Ann".to_string())),
            ("age", Value::Int(30)),
        ]);

        let err = table.insert(row).unwrap_err();
        assert!(matches!(err, StoreError::UnknownField(_)));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn table_crud_scenario() {
        let mut table = _users_table();
        table.insert(_user(1, "Ann")).unwrap();

        let found = table.find_row(&Value::Int(1)).unwrap();
        assert_eq!(found.get("name"), Some(&Value::Text("Ann".to_string())));
        assert!(!found.is_empty());
        assert_eq!(found.len(), table.fields().len());

        let updated = table
            .update_row(
                &Value::Int(1),
                _updates(vec![("name", Value::Text("Anna".to_string()))]),
            )
            .unwrap();
        assert!(updated);
        assert_eq!(
            table.find_row(&Value::Int(1)).unwrap().get("name"),
            Some(&Value::Text("Anna".to_string()))
        );

        assert_eq!(table.delete_row(&Value::Int(1)), true);
        assert!(table.find_row(&Value::Int(1)).is_none());
        assert_eq!(table.delete_row(&Value::Int(1)), false);
    }

    #[test]
    fn table_duplicate_key_insert_overwrites_index_entry() {
        let mut table = _users_table();
        table.insert(_user(1, "Ann")).unwrap();
        table.insert(_user(1, "Bo")).unwrap();

        // The older row lingers in storage but key lookup sees the
        // newer one.
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.find_row(&Value::Int(1)).unwrap().get("name"),
            Some(&Value::Text("Bo".to_string()))
        );
    }

    #[test]
    fn table_duplicate_key_then_delete_keeps_index_consistent() {
        let mut table = _users_table();
        table.insert(_user(1, "Ann")).unwrap();
        table.insert(_user(1, "Bo")).unwrap();

        // the delete unlinks the single index entry and removes the
        // first matching row; the lingering duplicate stays scan-only
        assert_eq!(table.delete_row(&Value::Int(1)), true);
        assert_eq!(table.len(), 1);
        assert!(table.find_row(&Value::Int(1)).is_none());
        assert_eq!(table.delete_row(&Value::Int(1)), false);
        assert_eq!(
            table.rows()[0].get("name"),
            Some(&Value::Text("Bo".to_string()))
        );
    }

    #[test]
    fn table_update_primary_key_always_fails() {
        let mut table = _users_table();
        table.insert(_user(1, "Ann")).unwrap();

        let err = table
            .update_row(&Value::Int(1), _updates(vec![("id", Value::Int(2))]))
            .unwrap_err();
        assert!(matches!(err, StoreError::PrimaryKeyImmutable));
        assert!(table.find_row(&Value::Int(1)).is_some());
    }

    #[test]
    fn table_update_unknown_field_does_not_partially_mutate() {
        let mut table = _users_table();
        table.insert(_user(1, "Ann")).unwrap();

        // valid key first, invalid second: nothing may be written
        let err = table
            .update_row(
                &Value::Int(1),
                _updates(vec![
                    ("name", Value::Text("Anna".to_string())),
                    ("age", Value::Int(30)),
                ]),
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::UnknownField(_)));
        assert_eq!(
            table.find_row(&Value::Int(1)).unwrap().get("name"),
            Some(&Value::Text("Ann".to_string()))
        );
    }

    #[test]
    fn table_update_missing_key_returns_false() {
        let mut table = _users_table();
        table.insert(_user(1, "Ann")).unwrap();

        let updated = table
            .update_row(
                &Value::Int(9),
                _updates(vec![("name", Value::Text("Nel".to_string()))]),
            )
            .unwrap();
        assert_eq!(updated, false);
    }

    #[test]
    fn table_add_column_backfills_null() {
        let mut table = _users_table();
        table.insert(_user(1, "Ann")).unwrap();
        table.insert(_user(2, "Bo")).unwrap();

        table
            .add_column(Field::new("email", FieldType::String, false))
            .unwrap();

        assert_eq!(table.fields().len(), 3);
        for row in table.rows() {
            assert!(row.get("email").unwrap().is_null());
            assert_eq!(row.len(), 3);
        }
    }

    #[test]
    fn table_add_column_rejects_duplicate_name() {
        let mut table = _users_table();
        let err = table
            .add_column(Field::new("name", FieldType::Int, false))
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateField(_)));
        assert_eq!(table.fields().len(), 2);
    }

    #[test]
    fn table_add_column_rejects_second_primary_key() {
        let mut table = _users_table();
        let err = table
            .add_column(Field::new("uuid", FieldType::String, true))
            .unwrap_err();

        assert!(matches!(err, StoreError::MultiplePrimaryKeys(_)));
        assert_eq!(table.fields().len(), 2);
    }

    #[test]
    fn table_index_stays_consistent_with_rows() {
        let mut table = _users_table();
        for (id, name) in [(1, "Jansen"), (2, "Bonega"), (3, "Lorem"), (4, "Rango")] {
            table.insert(_user(id, name)).unwrap();
        }

        assert!(table.delete_row(&Value::Int(2)));
        table
            .update_row(
                &Value::Int(4),
                _updates(vec![("name", Value::Text("Danish".to_string()))]),
            )
            .unwrap();
        assert!(table.delete_row(&Value::Int(1)));

        // every stored row is reachable by its key, and the mutation
        // through the table is visible via the index lookup
        for row in table.rows() {
            let pk = row.get("id").unwrap();
            assert_eq!(table.find_row(pk), Some(row));
        }
        assert_eq!(table.len(), 2);
        assert!(table.find_row(&Value::Int(1)).is_none());
        assert!(table.find_row(&Value::Int(2)).is_none());
        assert_eq!(
            table.find_row(&Value::Int(4)).unwrap().get("name"),
            Some(&Value::Text("Danish".to_string()))
        );
    }
}

#[cfg(test)]
mod storage {
    use std::fs;

    use granary::errors::StoreError;
    use granary::persistence::{Field, FieldType, FileStorage, Row, Table, Value};
    use tempfile::TempDir;

    fn _storage() -> (TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        (dir, storage)
    }

    fn _typed_table(name: &str) -> Table {
        Table::new(
            name,
            vec![
                Field::new("id", FieldType::Int, true),
                Field::new("name", FieldType::String, false),
                Field::new("score", FieldType::Double, false),
                Field::new("active", FieldType::Bool, false),
            ],
        )
        .unwrap()
    }

    fn _typed_row(id: i64, name: &str, score: Value, active: bool) -> Row {
        vec![
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::Text(name.to_string())),
            ("score".to_string(), score),
            ("active".to_string(), Value::Bool(active)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn storage_round_trip_preserves_schema_and_rows() {
        let (_dir, storage) = _storage();

        let mut table = _typed_table("players");
        table
            .insert(_typed_row(1, "Jansen", Value::Double(7.25), true))
            .unwrap();
        table
            .insert(_typed_row(2, "Bonega", Value::Null, false))
            .unwrap();
        storage.save(&table).unwrap();

        let loaded = storage.load("players").unwrap();

        let names: Vec<&str> = loaded.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "score", "active"]);
        assert_eq!(loaded.primary_key_field(), "id");
        assert_eq!(loaded.rows(), table.rows());
    }

    #[test]
    fn storage_round_trip_null_extra_column() {
        let (_dir, storage) = _storage();

        let mut table = Table::new(
            "users",
            vec![
                Field::new("id", FieldType::Int, true),
                Field::new("name", FieldType::String, false),
            ],
        )
        .unwrap();
        table
            .insert(
                vec![
                    ("id".to_string(), Value::Int(2)),
                    ("name".to_string(), Value::Text("Bo".to_string())),
                ]
                .into_iter()
                .collect(),
            )
            .unwrap();
        table
            .add_column(Field::new("extra", FieldType::String, false))
            .unwrap();
        storage.save(&table).unwrap();

        let loaded = storage.load("users").unwrap();
        let row = loaded.find_row(&Value::Int(2)).unwrap();
        assert_eq!(row.get("id"), Some(&Value::Int(2)));
        assert_eq!(row.get("name"), Some(&Value::Text("Bo".to_string())));
        assert_eq!(row.get("extra"), Some(&Value::Null));
    }

    #[test]
    fn storage_load_missing_table_fails() {
        let (_dir, storage) = _storage();
        let err = storage.load("nowhere").unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(_)));
    }

    #[test]
    fn storage_delete_is_idempotent() {
        let (_dir, storage) = _storage();

        let table = _typed_table("players");
        storage.save(&table).unwrap();

        storage.delete("players").unwrap();
        storage.delete("players").unwrap();
        assert!(matches!(
            storage.load("players").unwrap_err(),
            StoreError::TableNotFound(_)
        ));
    }

    #[test]
    fn storage_quotes_delimiters_in_values() {
        let (_dir, storage) = _storage();

        let mut table = _typed_table("players");
        table
            .insert(_typed_row(
                1,
                "says \"hi\", twice\nper line",
                Value::Double(0.5),
                true,
            ))
            .unwrap();
        storage.save(&table).unwrap();

        let loaded = storage.load("players").unwrap();
        assert_eq!(
            loaded.find_row(&Value::Int(1)).unwrap().get("name"),
            Some(&Value::Text("says \"hi\", twice\nper line".to_string()))
        );
    }

    #[test]
    fn storage_substitutes_spaces_in_table_names() {
        let (_dir, storage) = _storage();

        let table = _typed_table("match results");
        storage.save(&table).unwrap();

        assert_eq!(storage.list_tables().unwrap(), vec!["match results"]);
        assert!(storage.load("match results").is_ok());
    }

    #[test]
    fn storage_load_reports_untypable_cell() {
        let (dir, storage) = _storage();

        fs::write(
            dir.path().join("t.schema.json"),
            r#"{"fields":[{"name":"id","type":"int","is_primary":true}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("t.csv"), "id\nxyz\n").unwrap();

        let err = storage.load("t").unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn storage_reload_keeps_overwrite_policy_for_duplicate_keys() {
        let (_dir, storage) = _storage();

        let mut table = _typed_table("players");
        table
            .insert(_typed_row(1, "Ann", Value::Null, true))
            .unwrap();
        table
            .insert(_typed_row(1, "Bo", Value::Null, true))
            .unwrap();
        storage.save(&table).unwrap();

        let loaded = storage.load("players").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.find_row(&Value::Int(1)).unwrap().get("name"),
            Some(&Value::Text("Bo".to_string()))
        );
    }
}

#[cfg(test)]
mod database {
    use std::fs;

    use granary::errors::StoreError;
    use granary::persistence::{Database, Field, FieldType, Value};

    fn _users_fields() -> Vec<Field> {
        vec![
            Field::new("id", FieldType::Int, true),
            Field::new("name", FieldType::String, false),
        ]
    }

    #[test]
    fn database_reopen_restores_saved_tables() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut database = Database::open(dir.path()).unwrap();
            database.create_table("users", _users_fields()).unwrap();

            let table = database.get_table_mut("users").unwrap();
            table
                .insert(
                    vec![
                        ("id".to_string(), Value::Int(1)),
                        ("name".to_string(), Value::Text("Ann".to_string())),
                    ]
                    .into_iter()
                    .collect(),
                )
                .unwrap();
            database.save_table("users").unwrap();
        }

        let database = Database::open(dir.path()).unwrap();
        let table = database.get_table("users").unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.find_row(&Value::Int(1)).is_some());
    }

    #[test]
    fn database_create_duplicate_table_fails() {
        let mut database = Database::in_memory();
        database.create_table("users", _users_fields()).unwrap();

        let err = database
            .create_table("users", _users_fields())
            .unwrap_err();
        assert!(matches!(err, StoreError::TableExists(_)));
    }

    #[test]
    fn database_drop_table_removes_artifacts() {
        let dir = tempfile::tempdir().unwrap();

        let mut database = Database::open(dir.path()).unwrap();
        database.create_table("users", _users_fields()).unwrap();
        database.drop_table("users").unwrap();

        let database = Database::open(dir.path()).unwrap();
        assert!(!database.contains_table("users"));
    }

    #[test]
    fn database_drop_missing_table_fails() {
        let mut database = Database::in_memory();
        let err = database.drop_table("ghosts").unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(_)));
    }

    #[test]
    fn database_startup_skips_unloadable_table() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut database = Database::open(dir.path()).unwrap();
            database.create_table("good", _users_fields()).unwrap();
            database.create_table("bad", _users_fields()).unwrap();
        }
        fs::write(dir.path().join("bad.schema.json"), "not json at all").unwrap();

        let database = Database::open(dir.path()).unwrap();
        assert!(database.contains_table("good"));
        assert!(!database.contains_table("bad"));
    }

    #[test]
    fn database_in_memory_save_is_a_noop() {
        let mut database = Database::in_memory();
        database.create_table("users", _users_fields()).unwrap();
        database.save_table("users").unwrap();
    }
}
