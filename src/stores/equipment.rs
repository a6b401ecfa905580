use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{EquipmentStore, StoreError};
use crate::models::Equipment;

#[derive(Clone)]
pub struct PgEquipmentStore {
  pool: PgPool,
}

impl PgEquipmentStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl EquipmentStore for PgEquipmentStore {
  async fn create(&self, equipment: &Equipment) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO equipment (id, name, available_quantity) VALUES ($1, $2, $3)")
      .bind(equipment.id)
      .bind(&equipment.name)
      .bind(equipment.available_quantity)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn get(&self, id: Uuid) -> Result<Equipment, StoreError> {
    let row = sqlx::query("SELECT id, name, available_quantity FROM equipment WHERE id = $1")
      .bind(id)
      .fetch_one(&self.pool)
      .await?;
    Ok(Equipment {
      id: row.get("id"),
      name: row.get("name"),
      available_quantity: row.get("available_quantity"),
    })
  }
}
