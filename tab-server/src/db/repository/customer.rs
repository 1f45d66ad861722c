use sqlx::PgConnection;

use shared::ids::CustomerId;
use shared::model::Customer;

use super::{DbResult, row_not_found};

pub async fn create_customer(
    conn: &mut PgConnection,
    login_id: &str,
    password_hash: &str,
    name: &str,
    email: &str,
    phone_number: &str,
) -> DbResult<Customer> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r#"
        insert into customers (login_id, password_hash, name, email, phone_number)
        values ($1, $2, $3, $4, $5)
        returning id, login_id, name, email, phone_number, created_at, updated_at
        "#,
    )
    .bind(login_id)
    .bind(password_hash)
    .bind(name)
    .bind(email)
    .bind(phone_number)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row.into())
}

pub async fn get_customer_by_id(conn: &mut PgConnection, id: CustomerId) -> DbResult<Customer> {
    let row = sqlx::query_as::<_, CustomerRow>(
        "select id, login_id, name, email, phone_number, created_at, updated_at from customers where id = $1",
    )
    .bind(id.0)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| row_not_found(format!("customer {id}")))?;
    Ok(row.into())
}

/// Returns the stored password hash alongside the customer id, for
/// `AuthService::GenerateToken` to verify against.
pub async fn get_customer_by_login(
    conn: &mut PgConnection,
    login_id: &str,
) -> DbResult<(CustomerId, String)> {
    let row = sqlx::query_as::<_, (uuid::Uuid, String)>(
        "select id, password_hash from customers where login_id = $1",
    )
    .bind(login_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| row_not_found(format!("customer login {login_id}")))?;
    Ok((CustomerId(row.0), row.1))
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: uuid::Uuid,
    login_id: String,
    name: String,
    email: String,
    phone_number: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId(row.id),
            login_id: row.login_id,
            name: row.name,
            email: row.email,
            phone_number: row.phone_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
