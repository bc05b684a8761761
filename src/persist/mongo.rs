//! MongoDB document collection.
//!
//! Documents carry the user's `id` as a plain field next to the server's own
//! `_id`; every lookup filters on `id`.

use super::UserMirror;
use crate::core::{Result, StoreError, User, UserId};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use tracing::info;

pub struct MongoMirror {
    collection: Collection<User>,
    namespace: String,
}

impl MongoMirror {
    /// Connect and ping the server before handing out the collection.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.map_err(mongo_error)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(mongo_error)?;

        let namespace = format!("{database}.{collection}");
        info!(namespace = %namespace, "connected to mongo");

        Ok(Self {
            collection: client.database(database).collection::<User>(collection),
            namespace,
        })
    }
}

#[async_trait]
impl UserMirror for MongoMirror {
    async fn fetch_all(&self) -> Result<Vec<User>> {
        let cursor = self.collection.find(doc! {}).await.map_err(mongo_error)?;
        cursor.try_collect().await.map_err(mongo_error)
    }

    async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(user).await.map_err(mongo_error)?;
        Ok(())
    }

    async fn replace(&self, user: &User) -> Result<bool> {
        let result = self
            .collection
            .replace_one(doc! { "id": user.id }, user)
            .await
            .map_err(mongo_error)?;
        Ok(result.matched_count > 0)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "id": id })
            .await
            .map_err(mongo_error)?;
        Ok(result.deleted_count > 0)
    }

    fn describe(&self) -> String {
        format!("mongo:{}", self.namespace)
    }
}

fn mongo_error(err: mongodb::error::Error) -> StoreError {
    StoreError::persistence(format!("mongo: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a reachable server: USERDB_TEST_MONGO_URI=mongodb://localhost:27017
    #[tokio::test]
    #[ignore]
    async fn round_trip_against_live_server() {
        let uri = std::env::var("USERDB_TEST_MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let collection = format!("users_{}", uuid::Uuid::new_v4().simple());
        let mirror = MongoMirror::connect(&uri, "userdb_test", &collection)
            .await
            .unwrap();

        let ann = User {
            id: 1,
            name: "Ann".to_string(),
            age: 30,
        };
        mirror.insert(&ann).await.unwrap();
        assert!(
            mirror
                .replace(&User {
                    age: 31,
                    ..ann.clone()
                })
                .await
                .unwrap()
        );
        assert_eq!(mirror.fetch_all().await.unwrap()[0].age, 31);

        assert!(mirror.delete_by_id(1).await.unwrap());
        assert!(!mirror.delete_by_id(1).await.unwrap());
        assert!(mirror.fetch_all().await.unwrap().is_empty());

        mirror.collection.drop().await.unwrap();
    }
}
