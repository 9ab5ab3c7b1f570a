//! Staff user database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, phone, password_hash";

fn read_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
    })
}

impl Database {
    /// Insert a user whose password has already been hashed.
    pub fn insert_user(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password_hash: &str,
    ) -> DbResult<User> {
        self.conn.execute(
            "INSERT INTO users (name, email, phone, password_hash) VALUES (?1, ?2, ?3, ?4)",
            params![name, email, phone, password_hash],
        )?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [id],
                read_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a user by e-mail (case-insensitive).
    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
                [email],
                read_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete a user.
    pub fn delete_user(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM users WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    #[test]
    fn test_insert_and_lookup() {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .insert_user("joana", "joana@clinica.com.br", "+5592984244668", "hash")
            .unwrap();

        assert_eq!(db.get_user(user.id).unwrap().unwrap(), user);
        let by_email = db.get_user_by_email("JOANA@clinica.com.br").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[test]
    fn test_unique_name() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user("joana", "joana@clinica.com.br", "+5592984244668", "hash")
            .unwrap();
        let result = db.insert_user("joana", "outra@clinica.com.br", "+5511912345678", "hash");
        assert!(matches!(result, Err(DbError::Conflict(_))));
    }

    #[test]
    fn test_delete_user() {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .insert_user("joana", "joana@clinica.com.br", "+5592984244668", "hash")
            .unwrap();
        assert!(db.delete_user(user.id).unwrap());
        assert!(db.get_user(user.id).unwrap().is_none());
    }
}
