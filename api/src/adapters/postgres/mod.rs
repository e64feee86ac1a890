//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod entity;
pub mod mapping;
pub mod repository;


use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::domain::entities::{City, Country, Group, Role, User, UserRole};
use crate::domain::ports::RecordStore;

pub use mapping::TableMapping;
pub use repository::PostgresRepository;

/// `RecordStore` backed by a pooled PostgreSQL connection
#[derive(Clone)]
pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl RecordStore for PostgresStore {
    type Countries = PostgresRepository<Country>;
    type Cities = PostgresRepository<City>;
    type Users = PostgresRepository<User>;
    type Groups = PostgresRepository<Group>;
    type Roles = PostgresRepository<Role>;
    type UserRoles = PostgresRepository<UserRole>;

    fn countries(&self) -> Self::Countries {
        PostgresRepository::new(self.db.clone())
    }

    fn cities(&self) -> Self::Cities {
        PostgresRepository::new(self.db.clone())
    }

    fn users(&self) -> Self::Users {
        PostgresRepository::new(self.db.clone())
    }

    fn groups(&self) -> Self::Groups {
        PostgresRepository::new(self.db.clone())
    }

    fn roles(&self) -> Self::Roles {
        PostgresRepository::new(self.db.clone())
    }

    fn user_roles(&self) -> Self::UserRoles {
        PostgresRepository::new(self.db.clone())
    }
}

/// Create any missing tables from the entity definitions, parents first
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    create_table(db, &schema, entity::countries::Entity).await?;
    create_table(db, &schema, entity::cities::Entity).await?;
    create_table(db, &schema, entity::groups::Entity).await?;
    create_table(db, &schema, entity::roles::Entity).await?;
    create_table(db, &schema, entity::users::Entity).await?;
    create_table(db, &schema, entity::user_roles::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}
