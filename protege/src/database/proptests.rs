//! Property-based tests for snapshot persistence.

use super::test_util::create_test_database_with_store;
use crate::database::Row;
use crate::sql_params;
use crate::store::MemoryStore;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Mutation {
    Insert(String),
    Rename { id: i64, nom: String },
    Delete(i64),
    SetParam { cle: String, valeur: String },
}

fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        "[A-Za-zéè ]{1,24}".prop_map(Mutation::Insert),
        (1i64..20, "[A-Za-z]{1,12}").prop_map(|(id, nom)| Mutation::Rename { id, nom }),
        (1i64..20).prop_map(Mutation::Delete),
        ("[a-z_]{1,16}", "[ -~]{0,32}").prop_map(|(cle, valeur)| Mutation::SetParam { cle, valeur }),
    ]
}

fn apply(db: &mut crate::Database, mutation: &Mutation) {
    // Constraint violations are expected for random input; the service must stay usable.
    let _ = match mutation {
        Mutation::Insert(nom) => db.run(
            "INSERT INTO categories (nom) VALUES (?)",
            &sql_params![nom.as_str()],
        ),
        Mutation::Rename { id, nom } => db.run(
            "UPDATE categories SET nom = ? WHERE id = ?",
            &sql_params![nom.as_str(), *id],
        ),
        Mutation::Delete(id) => db.run("DELETE FROM categories WHERE id = ?", &sql_params![*id]),
        Mutation::SetParam { cle, valeur } => db.run(
            "INSERT OR REPLACE INTO parametres_systeme (cle, valeur) VALUES (?, ?)",
            &sql_params![cle.as_str(), valeur.as_str()],
        ),
    };
}

fn dump(db: &crate::Database) -> (Vec<Row>, Vec<Row>) {
    (
        db.query("SELECT * FROM categories ORDER BY id", &[]).unwrap(),
        db.query("SELECT cle, valeur, type FROM parametres_systeme ORDER BY id", &[])
            .unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    // Reloading from the stored snapshot reproduces every query result
    #[test]
    fn reload_reproduces_query_results(
        mutations in prop::collection::vec(mutation_strategy(), 0..40)
    ) {
        let store = MemoryStore::new();
        let mut db = create_test_database_with_store(store.clone());
        for mutation in &mutations {
            apply(&mut db, mutation);
        }
        db.flush().unwrap();
        let expected = dump(&db);
        drop(db);

        let reloaded = create_test_database_with_store(store);
        prop_assert_eq!(dump(&reloaded), expected);
    }

    // A backup restored into another service reproduces every query result
    #[test]
    fn backup_restore_reproduces_query_results(
        mutations in prop::collection::vec(mutation_strategy(), 0..40)
    ) {
        let mut source = create_test_database_with_store(MemoryStore::new());
        for mutation in &mutations {
            apply(&mut source, mutation);
        }
        let backup = source.backup().unwrap();

        let mut target = create_test_database_with_store(MemoryStore::new());
        target.restore(backup.bytes()).unwrap();
        prop_assert_eq!(dump(&target), dump(&source));
    }
}
