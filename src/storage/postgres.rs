//! Gateway implementation backed by a PostgreSQL connection pool.

use crate::domain::model::{Car, CarPatch, NewCar, NewPerson, Person, PersonPatch, PersonUpdate};
use crate::domain::ownership::OwnerAssignment;
use crate::storage::{Page, RecordGateway};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

const PERSON_COLUMNS: &str = "id, name, cpf, birth_date";
const CAR_COLUMNS: &str = "id, make, model, year, color, price, owner_id";

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    /// Connects to `database_url` and makes sure both tables exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let gateway = Self::new(pool);
        gateway.ensure_schema().await?;
        Ok(gateway)
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS people (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                cpf TEXT NOT NULL UNIQUE,
                birth_date DATE NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cars (
                id SERIAL PRIMARY KEY,
                make TEXT NOT NULL,
                model TEXT NOT NULL,
                year INTEGER NOT NULL,
                color TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                owner_id INTEGER REFERENCES people(id) ON DELETE SET NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        for ddl in [
            "CREATE INDEX IF NOT EXISTS idx_people_name ON people (name)",
            "CREATE INDEX IF NOT EXISTS idx_cars_make ON cars (make)",
            "CREATE INDEX IF NOT EXISTS idx_cars_model ON cars (model)",
            "CREATE INDEX IF NOT EXISTS idx_cars_owner_id ON cars (owner_id)",
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Row counts for `(people, cars)`.
    pub async fn table_counts(&self) -> Result<(i64, i64)> {
        let people: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people")
            .fetch_one(&self.pool)
            .await?;
        let cars: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        Ok((people, cars))
    }

    /// Locks the person row (if any) so it cannot be deleted before `tx` commits.
    async fn person_exists_in_tx(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM people WHERE id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(tx.as_mut())
            .await?;
        Ok(row.is_some())
    }
}

fn person_from_row(row: &PgRow) -> Result<Person, sqlx::Error> {
    Ok(Person {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        cpf: row.try_get("cpf")?,
        birth_date: row.try_get("birth_date")?,
    })
}

fn car_from_row(row: &PgRow) -> Result<Car, sqlx::Error> {
    Ok(Car {
        id: row.try_get("id")?,
        make: row.try_get("make")?,
        model: row.try_get("model")?,
        year: row.try_get("year")?,
        color: row.try_get("color")?,
        price: row.try_get("price")?,
        owner_id: row.try_get("owner_id")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl RecordGateway for PgGateway {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_person(&self, id: i32) -> Result<Option<Person>> {
        let sql = format!("SELECT {} FROM people WHERE id = $1", PERSON_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(person_from_row).transpose()?)
    }

    async fn find_person_by_cpf(&self, cpf: &str) -> Result<Option<Person>> {
        let sql = format!("SELECT {} FROM people WHERE cpf = $1", PERSON_COLUMNS);
        let row = sqlx::query(&sql).bind(cpf).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(person_from_row).transpose()?)
    }

    async fn list_people(&self, page: Page) -> Result<Vec<Person>> {
        let sql = format!(
            "SELECT {} FROM people ORDER BY id OFFSET $1 LIMIT $2",
            PERSON_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(person_from_row).collect::<Result<_, _>>()?)
    }

    async fn insert_person(&self, new: NewPerson) -> Result<Option<Person>> {
        let sql = format!(
            "INSERT INTO people (name, cpf, birth_date) VALUES ($1, $2, $3)
             ON CONFLICT (cpf) DO NOTHING
             RETURNING {}",
            PERSON_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&new.name)
            .bind(&new.cpf)
            .bind(new.birth_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(person_from_row).transpose()?)
    }

    async fn update_person(&self, id: i32, patch: PersonPatch) -> Result<PersonUpdate> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM people WHERE id = $1 FOR UPDATE", PERSON_COLUMNS);
        let row = sqlx::query(&select).bind(id).fetch_optional(&mut *tx).await?;
        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(PersonUpdate::NotFound);
        };
        let mut person = person_from_row(&row)?;
        person.apply(patch);

        let update = format!(
            "UPDATE people SET name = $2, cpf = $3, birth_date = $4 WHERE id = $1 RETURNING {}",
            PERSON_COLUMNS
        );
        let result = sqlx::query(&update)
            .bind(id)
            .bind(&person.name)
            .bind(&person.cpf)
            .bind(person.birth_date)
            .fetch_one(&mut *tx)
            .await;

        match result {
            Ok(row) => {
                let updated = person_from_row(&row)?;
                tx.commit().await?;
                Ok(PersonUpdate::Updated(updated))
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await?;
                Ok(PersonUpdate::CpfTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_person(&self, id: i32) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let released = sqlx::query("UPDATE cars SET owner_id = NULL WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;

        if released > 0 {
            tracing::info!(person_id = id, cars = released, "released cars of deleted person");
        }
        Ok(true)
    }

    async fn find_car(&self, id: i32) -> Result<Option<Car>> {
        let sql = format!("SELECT {} FROM cars WHERE id = $1", CAR_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(car_from_row).transpose()?)
    }

    async fn list_cars(&self, page: Page) -> Result<Vec<Car>> {
        let sql = format!("SELECT {} FROM cars ORDER BY id OFFSET $1 LIMIT $2", CAR_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(car_from_row).collect::<Result<_, _>>()?)
    }

    async fn list_cars_by_owner(&self, owner_id: i32) -> Result<Vec<Car>> {
        let sql = format!("SELECT {} FROM cars WHERE owner_id = $1 ORDER BY id", CAR_COLUMNS);
        let rows = sqlx::query(&sql).bind(owner_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(car_from_row).collect::<Result<_, _>>()?)
    }

    async fn insert_car(&self, new: NewCar) -> Result<OwnerAssignment> {
        let mut tx = self.pool.begin().await?;

        if let Some(owner_id) = new.owner_id {
            if !Self::person_exists_in_tx(&mut tx, owner_id).await? {
                tx.rollback().await?;
                return Ok(OwnerAssignment::OwnerNotFound);
            }
        }

        let sql = format!(
            "INSERT INTO cars (make, model, year, color, price, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            CAR_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&new.make)
            .bind(&new.model)
            .bind(new.year)
            .bind(&new.color)
            .bind(new.price)
            .bind(new.owner_id)
            .fetch_one(&mut *tx)
            .await?;
        let car = car_from_row(&row)?;
        tx.commit().await?;
        Ok(OwnerAssignment::Assigned(car))
    }

    async fn update_car(&self, id: i32, patch: CarPatch) -> Result<OwnerAssignment> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM cars WHERE id = $1 FOR UPDATE", CAR_COLUMNS);
        let row = sqlx::query(&select).bind(id).fetch_optional(&mut *tx).await?;
        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(OwnerAssignment::CarNotFound);
        };
        let mut car = car_from_row(&row)?;

        if let Some(owner_id) = patch.assigned_owner() {
            if !Self::person_exists_in_tx(&mut tx, owner_id).await? {
                tx.rollback().await?;
                return Ok(OwnerAssignment::OwnerNotFound);
            }
        }
        car.apply(patch);

        let update = format!(
            "UPDATE cars SET make = $2, model = $3, year = $4, color = $5, price = $6, owner_id = $7
             WHERE id = $1
             RETURNING {}",
            CAR_COLUMNS
        );
        let row = sqlx::query(&update)
            .bind(id)
            .bind(&car.make)
            .bind(&car.model)
            .bind(car.year)
            .bind(&car.color)
            .bind(car.price)
            .bind(car.owner_id)
            .fetch_one(&mut *tx)
            .await?;
        let updated = car_from_row(&row)?;
        tx.commit().await?;
        Ok(OwnerAssignment::Assigned(updated))
    }

    async fn delete_car(&self, id: i32) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
