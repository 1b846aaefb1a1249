use crate::domain::model::EntityKind;
use crate::utils::validation::{PRICE_MAX, PRICE_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
}

/// 一對多的擁有關係：parent 刪除時依 `on_delete` 處理 child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub parent: EntityKind,
    pub child: EntityKind,
    pub foreign_key: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug)]
pub struct Schema {
    pub tables: [EntityKind; 3],
    pub relations: [Relation; 2],
}

static SCHEMA: Schema = Schema {
    tables: [
        EntityKind::Restaurant,
        EntityKind::Pizza,
        EntityKind::RestaurantPizza,
    ],
    relations: [
        Relation {
            parent: EntityKind::Restaurant,
            child: EntityKind::RestaurantPizza,
            foreign_key: "restaurant_id",
            on_delete: OnDelete::Cascade,
        },
        Relation {
            parent: EntityKind::Pizza,
            child: EntityKind::RestaurantPizza,
            foreign_key: "pizza_id",
            on_delete: OnDelete::Cascade,
        },
    ],
};

/// Restaurant 與 Pizza 各自擁有零到多筆 RestaurantPizza，刪除時連帶刪除
pub fn declare_schema() -> &'static Schema {
    &SCHEMA
}

impl Schema {
    /// 刪除 `kind` 時必須在同一個交易內一併刪除的關係
    pub fn dependents_of(&self, kind: EntityKind) -> impl Iterator<Item = &Relation> {
        self.relations
            .iter()
            .filter(move |relation| relation.parent == kind)
    }

    pub fn owners_of(&self, kind: EntityKind) -> impl Iterator<Item = &Relation> {
        self.relations
            .iter()
            .filter(move |relation| relation.child == kind)
    }

    pub fn ddl(&self) -> Vec<String> {
        self.tables
            .iter()
            .map(|kind| self.create_table(*kind))
            .collect()
    }

    fn create_table(&self, kind: EntityKind) -> String {
        let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];

        match kind {
            EntityKind::Restaurant => {
                columns.push("name TEXT NOT NULL".to_string());
                columns.push("address TEXT NOT NULL".to_string());
            }
            EntityKind::Pizza => {
                columns.push("name TEXT NOT NULL".to_string());
                columns.push("ingredients TEXT NOT NULL".to_string());
            }
            EntityKind::RestaurantPizza => {
                columns.push("price INTEGER NOT NULL".to_string());
            }
        }

        let owners: Vec<&Relation> = self.owners_of(kind).collect();
        for relation in &owners {
            columns.push(format!("{} INTEGER NOT NULL", relation.foreign_key));
        }
        for relation in &owners {
            let action = match relation.on_delete {
                OnDelete::Cascade => "CASCADE",
            };
            columns.push(format!(
                "CONSTRAINT fk_{}_{}_{} FOREIGN KEY ({}) REFERENCES {}(id) ON DELETE {}",
                kind.table_name(),
                relation.foreign_key,
                relation.parent.table_name(),
                relation.foreign_key,
                relation.parent.table_name(),
                action
            ));
        }

        if kind == EntityKind::RestaurantPizza {
            columns.push(format!(
                "CONSTRAINT price_between_{}_and_{} CHECK (price >= {} AND price <= {})",
                PRICE_MIN, PRICE_MAX, PRICE_MIN, PRICE_MAX
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            kind.table_name(),
            columns.join(",\n    ")
        )
    }
}
