use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::item::{CatalogItem, CatalogItemChanges, ItemDetails, NewCatalogItem};
use crate::domain::types::{DownloadCount, ItemId, ItemKind};
use crate::models::mods::{Mod as DbMod, ModChanges as DbModChanges, NewMod as DbNewMod};
use crate::models::versions::{
    NewVersion as DbNewVersion, Version as DbVersion, VersionChanges as DbVersionChanges,
};
use crate::repository::{CatalogReader, CatalogWriter, DieselRepository};

impl CatalogReader for DieselRepository {
    fn list_items(&self, kind: ItemKind) -> RepositoryResult<Vec<CatalogItem>> {
        use crate::schema::{mods, versions};

        let mut conn = self.conn()?;

        let items = match kind {
            ItemKind::Mod => mods::table
                .order((mods::created_at.desc(), mods::id.desc()))
                .load::<DbMod>(&mut conn)?
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<CatalogItem>, _>>()?,
            ItemKind::Version => versions::table
                .order((versions::created_at.desc(), versions::id.desc()))
                .load::<DbVersion>(&mut conn)?
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<CatalogItem>, _>>()?,
        };

        Ok(items)
    }

    fn get_item_by_id(&self, kind: ItemKind, id: ItemId) -> RepositoryResult<Option<CatalogItem>> {
        use crate::schema::{mods, versions};

        let mut conn = self.conn()?;

        let item: Option<CatalogItem> = match kind {
            ItemKind::Mod => mods::table
                .find(id.get())
                .first::<DbMod>(&mut conn)
                .optional()?
                .map(TryInto::try_into)
                .transpose()?,
            ItemKind::Version => versions::table
                .find(id.get())
                .first::<DbVersion>(&mut conn)
                .optional()?
                .map(TryInto::try_into)
                .transpose()?,
        };

        Ok(item)
    }

    fn check_connection(&self) -> RepositoryResult<()> {
        use crate::schema::{mods, versions};

        let mut conn = self.conn()?;

        // Fails with a database error when either table is missing.
        mods::table
            .select(mods::id)
            .limit(1)
            .load::<i32>(&mut conn)?;
        versions::table
            .select(versions::id)
            .limit(1)
            .load::<i32>(&mut conn)?;

        Ok(())
    }
}

impl CatalogWriter for DieselRepository {
    fn create_item(&self, item: &NewCatalogItem) -> RepositoryResult<CatalogItem> {
        use crate::schema::{mods, versions};

        let mut conn = self.conn()?;

        let created: CatalogItem = match &item.details {
            ItemDetails::Mod { category, version } => diesel::insert_into(mods::table)
                .values(DbNewMod::new(item, category, version.as_ref()))
                .get_result::<DbMod>(&mut conn)?
                .try_into()?,
            ItemDetails::Version { version } => diesel::insert_into(versions::table)
                .values(DbNewVersion::new(item, version))
                .get_result::<DbVersion>(&mut conn)?
                .try_into()?,
        };

        Ok(created)
    }

    fn update_item(&self, id: ItemId, changes: &CatalogItemChanges) -> RepositoryResult<usize> {
        use crate::schema::{mods, versions};

        let mut conn = self.conn()?;

        let affected = match &changes.details {
            ItemDetails::Mod { category, version } => diesel::update(mods::table.find(id.get()))
                .set(DbModChanges::new(changes, category, version.as_ref()))
                .execute(&mut conn)?,
            ItemDetails::Version { version } => diesel::update(versions::table.find(id.get()))
                .set(DbVersionChanges::new(changes, version))
                .execute(&mut conn)?,
        };

        Ok(affected)
    }

    fn delete_item(&self, kind: ItemKind, id: ItemId) -> RepositoryResult<usize> {
        use crate::schema::{mods, versions};

        let mut conn = self.conn()?;

        let affected = match kind {
            ItemKind::Mod => diesel::delete(mods::table.find(id.get())).execute(&mut conn)?,
            ItemKind::Version => {
                diesel::delete(versions::table.find(id.get())).execute(&mut conn)?
            }
        };

        Ok(affected)
    }

    fn increment_downloads(
        &self,
        kind: ItemKind,
        id: ItemId,
    ) -> RepositoryResult<Option<DownloadCount>> {
        use crate::schema::{mods, versions};

        let mut conn = self.conn()?;

        // Single statement so concurrent downloads cannot lose an increment.
        let downloads = match kind {
            ItemKind::Mod => diesel::update(mods::table.find(id.get()))
                .set(mods::downloads.eq(mods::downloads + 1))
                .returning(mods::downloads)
                .get_result::<i32>(&mut conn)
                .optional()?,
            ItemKind::Version => diesel::update(versions::table.find(id.get()))
                .set(versions::downloads.eq(versions::downloads + 1))
                .returning(versions::downloads)
                .get_result::<i32>(&mut conn)
                .optional()?,
        };

        Ok(downloads.map(DownloadCount::new).transpose()?)
    }
}
