//! Batched two-list predicates agree with the unbatched query.

use proptest::prelude::*;
use rusqlite::Connection;
use strata_storage::batching::{batched_and, batched_query};

fn edge_table(pairs: &[(i64, i64)]) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE e (a INTEGER NOT NULL, b INTEGER NOT NULL, PRIMARY KEY (a, b));")
        .unwrap();
    for (a, b) in pairs {
        conn.execute("INSERT OR IGNORE INTO e (a, b) VALUES (?1, ?2)", [a, b])
            .unwrap();
    }
    conn
}

fn unbatched(conn: &Connection, a_ids: &[i64], b_ids: &[i64]) -> Vec<(i64, i64)> {
    let a_set: std::collections::BTreeSet<i64> = a_ids.iter().copied().collect();
    let b_set: std::collections::BTreeSet<i64> = b_ids.iter().copied().collect();
    let mut stmt = conn.prepare("SELECT a, b FROM e ORDER BY a, b").unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .filter(|(a, b)| a_set.contains(a) && b_set.contains(b))
        .collect()
}

#[test]
fn two_list_predicate_over_many_ids_matches_cross_chunk_rows() {
    // Row (0, 999): `a` lands in the first chunk of A, `b` in the last chunk of B.
    let pairs: Vec<(i64, i64)> = (0..1000).map(|i| (i, 999 - i)).collect();
    let conn = edge_table(&pairs);
    let ids: Vec<i64> = (0..1000).collect();

    let found = batched_and(
        &conn,
        "SELECT a, b FROM e WHERE a IN ({ids})",
        &ids,
        "SELECT a, b FROM e WHERE b IN ({ids})",
        &ids,
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )
    .unwrap();
    assert_eq!(found.len(), 1000);
    assert!(found.contains(&(0, 999)));
}

#[test]
fn string_ids_are_chunked_too() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE n (name TEXT PRIMARY KEY);").unwrap();
    let names: Vec<String> = (0..900).map(|i| format!("sym_{i}")).collect();
    for n in &names {
        conn.execute("INSERT INTO n (name) VALUES (?1)", [n]).unwrap();
    }
    let found = batched_query(&conn, "SELECT name FROM n WHERE name IN ({ids})", &names, |r| {
        r.get::<_, String>(0)
    })
    .unwrap();
    assert_eq!(found.len(), 900);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn batched_and_equals_unbatched(
        pairs in prop::collection::vec((0i64..1500, 0i64..1500), 0..600),
        a_ids in prop::collection::vec(0i64..1500, 0..900),
        b_ids in prop::collection::vec(0i64..1500, 0..900),
    ) {
        let conn = edge_table(&pairs);
        let batched = batched_and(
            &conn,
            "SELECT a, b FROM e WHERE a IN ({ids})",
            &a_ids,
            "SELECT a, b FROM e WHERE b IN ({ids})",
            &b_ids,
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .unwrap();
        prop_assert_eq!(batched, unbatched(&conn, &a_ids, &b_ids));
    }
}
