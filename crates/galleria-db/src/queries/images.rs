//! Image metadata CRUD operations.

use galleria_common::{Error, Result};
use rusqlite::Connection;

use crate::models::ImageRecord;

const COLS: &str = "id, image_name, category";

/// Insert a new image row and return the stored record with its
/// database-assigned id.
pub fn insert_image(conn: &Connection, image_name: &str, category: &str) -> Result<ImageRecord> {
    conn.execute(
        "INSERT INTO images (image_name, category) VALUES (?1, ?2)",
        rusqlite::params![image_name, category],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(ImageRecord {
        id: conn.last_insert_rowid(),
        image_name: image_name.to_string(),
        category: category.to_string(),
    })
}

/// Look up the object-store key for an id.
pub fn find_name_by_id(conn: &Connection, id: i64) -> Result<Option<String>> {
    let result = conn.query_row(
        "SELECT image_name FROM images WHERE id = ?1",
        [id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(name) => Ok(Some(name)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get an image row by id.
pub fn get_image(conn: &Connection, id: i64) -> Result<Option<ImageRecord>> {
    let q = format!("SELECT {COLS} FROM images WHERE id = ?1");
    let result = conn.query_row(&q, [id], ImageRecord::from_row);

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Delete an image row by id, returning the number of rows affected.
pub fn delete_by_id(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM images WHERE id = ?1", [id])
        .map_err(|e| Error::database(e.to_string()))
}

/// List all images, oldest first.
pub fn list_images(conn: &Connection) -> Result<Vec<ImageRecord>> {
    let q = format!("SELECT {COLS} FROM images ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], ImageRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// List images in a single category, oldest first.
pub fn list_by_category(conn: &Connection, category: &str) -> Result<Vec<ImageRecord>> {
    let q = format!("SELECT {COLS} FROM images WHERE category = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([category], ImageRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// List all images grouped by category, categories in sorted order.
pub fn list_grouped(conn: &Connection) -> Result<Vec<(String, Vec<ImageRecord>)>> {
    let q = format!("SELECT {COLS} FROM images ORDER BY category, id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], ImageRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut groups: Vec<(String, Vec<ImageRecord>)> = Vec::new();
    for record in rows {
        match groups.last_mut() {
            Some((category, records)) if *category == record.category => records.push(record),
            _ => groups.push((record.category.clone(), vec![record])),
        }
    }
    Ok(groups)
}

/// Count all image rows.
pub fn count_images(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn insert_assigns_sequential_ids() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let a = insert_image(&conn, "1-a.png", "Category1").unwrap();
        let b = insert_image(&conn, "2-b.png", "Category1").unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn find_name_by_id_round_trip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let rec = insert_image(&conn, "1-a.png", "Category1").unwrap();
        let name = find_name_by_id(&conn, rec.id).unwrap();
        assert_eq!(name.as_deref(), Some("1-a.png"));
    }

    #[test]
    fn find_name_by_id_missing() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(find_name_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn get_image_round_trip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let rec = insert_image(&conn, "1-a.png", "Category2").unwrap();
        let found = get_image(&conn, rec.id).unwrap().unwrap();
        assert_eq!(found, rec);

        assert!(get_image(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn delete_by_id_reports_rows_affected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let rec = insert_image(&conn, "1-a.png", "Category1").unwrap();
        assert_eq!(delete_by_id(&conn, rec.id).unwrap(), 1);
        assert_eq!(delete_by_id(&conn, rec.id).unwrap(), 0);
        assert!(find_name_by_id(&conn, rec.id).unwrap().is_none());
    }

    #[test]
    fn list_images_ordered_by_id() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        insert_image(&conn, "1-a.png", "Category2").unwrap();
        insert_image(&conn, "2-b.png", "Category1").unwrap();

        let all = list_images(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].image_name, "1-a.png");
        assert_eq!(all[1].image_name, "2-b.png");
    }

    #[test]
    fn list_by_category_filters() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        insert_image(&conn, "1-a.png", "Category1").unwrap();
        insert_image(&conn, "2-b.png", "Category2").unwrap();
        insert_image(&conn, "3-c.png", "Category1").unwrap();

        let cat1 = list_by_category(&conn, "Category1").unwrap();
        assert_eq!(cat1.len(), 2);
        assert!(cat1.iter().all(|r| r.category == "Category1"));

        assert!(list_by_category(&conn, "Nope").unwrap().is_empty());
    }

    #[test]
    fn list_grouped_groups_and_sorts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        insert_image(&conn, "1-a.png", "Zoo").unwrap();
        insert_image(&conn, "2-b.png", "Art").unwrap();
        insert_image(&conn, "3-c.png", "Zoo").unwrap();

        let groups = list_grouped(&conn).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Art");
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[1].0, "Zoo");
        assert_eq!(groups[1].1.len(), 2);
    }

    #[test]
    fn list_grouped_empty() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(list_grouped(&conn).unwrap().is_empty());
    }

    #[test]
    fn count_images_tracks_inserts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert_eq!(count_images(&conn).unwrap(), 0);
        insert_image(&conn, "1-a.png", "Category1").unwrap();
        assert_eq!(count_images(&conn).unwrap(), 1);
    }

    #[test]
    fn category_is_stored_verbatim() {
        // Categories are pass-through labels; nothing normalizes or
        // validates them.
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let rec = insert_image(&conn, "1-a.png", "  WeIrD  ").unwrap();
        let found = get_image(&conn, rec.id).unwrap().unwrap();
        assert_eq!(found.category, "  WeIrD  ");
    }
}
