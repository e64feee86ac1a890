//! Record ↔ SeaORM model mapping
//!
//! `TableMapping` is the only per-table code the generic repository needs:
//! where the rows live, which columns answer a `Lookup`, and how one record
//! is loaded, inserted, updated and deleted.

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entity::{cities, countries, groups, roles, user_roles, users};
use crate::domain::entities::{City, Country, Gender, Group, Record, Role, User, UserRole};
use crate::domain::ports::Lookup;

#[async_trait]
pub trait TableMapping: Record {
    /// Table name, also used to find the id sequence
    const TABLE: &'static str;

    /// WHERE clause answering `lookup`; `None` when the table has no
    /// column for it
    fn condition(lookup: &Lookup) -> Option<SimpleExpr>;

    async fn load_all(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr>;

    async fn load_matching(
        db: &DatabaseConnection,
        lookup: &Lookup,
    ) -> Result<Vec<Self>, DbErr>;

    async fn insert(self, txn: &DatabaseTransaction) -> Result<(), DbErr>;

    async fn update(self, txn: &DatabaseTransaction) -> Result<(), DbErr>;

    async fn delete(self, txn: &DatabaseTransaction) -> Result<(), DbErr>;
}

/// `UPPER(TRIM(column))`, the SQL side of `normalize_name`
fn normalized(column: impl Into<SimpleExpr>) -> SimpleExpr {
    Func::upper(Func::cust(Alias::new("TRIM")).arg(column)).into()
}

macro_rules! table_mapping {
    ($record:ty, $table:ident $(, name: $name:ident)? $(, parent: $parent:ident)?) => {
        #[async_trait]
        impl TableMapping for $record {
            const TABLE: &'static str = stringify!($table);

            fn condition(lookup: &Lookup) -> Option<SimpleExpr> {
                match lookup {
                    Lookup::Id(id) => Some($table::Column::Id.eq(*id)),
                    $(Lookup::Name(name) => Some(
                        Expr::expr(normalized(Expr::col((
                            $table::Entity,
                            $table::Column::$name,
                        ))))
                        .eq(name.clone()),
                    ),)?
                    $(Lookup::Parent(id) => Some($table::Column::$parent.eq(*id)),)?
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            async fn load_all(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
                let models = $table::Entity::find()
                    .order_by_asc($table::Column::Id)
                    .all(db)
                    .await?;
                Ok(models.into_iter().map(Self::from).collect())
            }

            async fn load_matching(
                db: &DatabaseConnection,
                lookup: &Lookup,
            ) -> Result<Vec<Self>, DbErr> {
                let Some(condition) = Self::condition(lookup) else {
                    return Ok(Vec::new());
                };
                let models = $table::Entity::find()
                    .filter(condition)
                    .order_by_asc($table::Column::Id)
                    .all(db)
                    .await?;
                Ok(models.into_iter().map(Self::from).collect())
            }

            async fn insert(self, txn: &DatabaseTransaction) -> Result<(), DbErr> {
                $table::ActiveModel::from(self).insert(txn).await?;
                Ok(())
            }

            async fn update(self, txn: &DatabaseTransaction) -> Result<(), DbErr> {
                $table::ActiveModel::from(self).update(txn).await?;
                Ok(())
            }

            async fn delete(self, txn: &DatabaseTransaction) -> Result<(), DbErr> {
                let result = $table::Entity::delete_by_id(self.id()).exec(txn).await?;
                if result.rows_affected == 0 {
                    return Err(DbErr::RecordNotFound(format!(
                        "{} {}",
                        Self::ENTITY,
                        self.id()
                    )));
                }
                Ok(())
            }
        }
    };
}

table_mapping!(Country, countries, name: CountryName);
table_mapping!(City, cities, name: CityName, parent: CountryId);
table_mapping!(User, users);
table_mapping!(Group, groups, name: Title);
table_mapping!(Role, roles, name: Name);
table_mapping!(UserRole, user_roles, parent: UserId);

impl From<countries::Model> for Country {
    fn from(model: countries::Model) -> Self {
        Country {
            id: model.id,
            guid: model.guid,
            country_name: model.country_name,
        }
    }
}

impl From<Country> for countries::ActiveModel {
    fn from(country: Country) -> Self {
        countries::ActiveModel {
            id: Set(country.id),
            guid: Set(country.guid),
            country_name: Set(country.country_name),
        }
    }
}

impl From<cities::Model> for City {
    fn from(model: cities::Model) -> Self {
        City {
            id: model.id,
            guid: model.guid,
            city_name: model.city_name,
            country_id: model.country_id,
        }
    }
}

impl From<City> for cities::ActiveModel {
    fn from(city: City) -> Self {
        cities::ActiveModel {
            id: Set(city.id),
            guid: Set(city.guid),
            city_name: Set(city.city_name),
            country_id: Set(city.country_id),
        }
    }
}

impl From<users::Gender> for Gender {
    fn from(gender: users::Gender) -> Self {
        match gender {
            users::Gender::Woman => Gender::Woman,
            users::Gender::Man => Gender::Man,
        }
    }
}

impl From<Gender> for users::Gender {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Woman => users::Gender::Woman,
            Gender::Man => users::Gender::Man,
        }
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: model.id,
            guid: model.guid,
            user_name: model.user_name,
            first_name: model.first_name,
            last_name: model.last_name,
            gender: model.gender.into(),
            birth_date: model.birth_date,
            registration_date: model.registration_date,
            score: model.score,
            is_active: model.is_active,
            address: model.address,
            country_id: model.country_id,
            city_id: model.city_id,
            group_id: model.group_id,
        }
    }
}

impl From<User> for users::ActiveModel {
    fn from(user: User) -> Self {
        users::ActiveModel {
            id: Set(user.id),
            guid: Set(user.guid),
            user_name: Set(user.user_name),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            gender: Set(user.gender.into()),
            birth_date: Set(user.birth_date),
            registration_date: Set(user.registration_date),
            score: Set(user.score),
            is_active: Set(user.is_active),
            address: Set(user.address),
            country_id: Set(user.country_id),
            city_id: Set(user.city_id),
            group_id: Set(user.group_id),
        }
    }
}

impl From<groups::Model> for Group {
    fn from(model: groups::Model) -> Self {
        Group {
            id: model.id,
            guid: model.guid,
            title: model.title,
        }
    }
}

impl From<Group> for groups::ActiveModel {
    fn from(group: Group) -> Self {
        groups::ActiveModel {
            id: Set(group.id),
            guid: Set(group.guid),
            title: Set(group.title),
        }
    }
}

impl From<roles::Model> for Role {
    fn from(model: roles::Model) -> Self {
        Role {
            id: model.id,
            guid: model.guid,
            name: model.name,
        }
    }
}

impl From<Role> for roles::ActiveModel {
    fn from(role: Role) -> Self {
        roles::ActiveModel {
            id: Set(role.id),
            guid: Set(role.guid),
            name: Set(role.name),
        }
    }
}

impl From<user_roles::Model> for UserRole {
    fn from(model: user_roles::Model) -> Self {
        UserRole {
            id: model.id,
            guid: model.guid,
            user_id: model.user_id,
            role_id: model.role_id,
        }
    }
}

impl From<UserRole> for user_roles::ActiveModel {
    fn from(user_role: UserRole) -> Self {
        user_roles::ActiveModel {
            id: Set(user_role.id),
            guid: Set(user_role.guid),
            user_id: Set(user_role.user_id),
            role_id: Set(user_role.role_id),
        }
    }
}
