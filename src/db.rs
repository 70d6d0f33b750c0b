use crate::errors::RecipeError;
use crate::ingredient_model::ParsedIngredient;
use crate::recipe::{search_query, NewRecipe, Recipe, RecipeDetails, RecipePage};
use crate::shopping_list::{
    remove_item, remove_recipe_items, scale_recipe_into_items, validate_list_title, ListItem,
    ListView, ShoppingList,
};
use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info};

const RECIPE_COLUMNS: &str = "id, user_id, title, ingredients, tags, details, date_created, date_last_edited";
const LIST_COLUMNS: &str = "id, user_id, title, items, date_created, date_last_edited";

/// Weighted search document: title (A), ingredient names (B), tags (C)
const SEARCH_VECTOR: &str = "setweight(to_tsvector('english', $2), 'A') \
     || setweight(to_tsvector('english', $6), 'B') \
     || setweight(to_tsvector('english', array_to_string($4::text[], ' ')), 'C')";

/// Open a connection pool
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!(max_connections, "Connecting to database");

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipes (
            id BIGSERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            ingredients JSONB NOT NULL DEFAULT '[]',
            tags TEXT[] NOT NULL DEFAULT '{}',
            details JSONB NOT NULL DEFAULT '{}',
            search_vector TSVECTOR,
            date_created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            date_last_edited TIMESTAMPTZ
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipes table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS recipes_user_idx ON recipes (user_id)")
        .execute(pool)
        .await
        .context("Failed to create recipes user index")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS recipes_url_idx ON recipes (user_id, (details->>'url'))")
        .execute(pool)
        .await
        .context("Failed to create recipes url index")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS recipes_search_idx ON recipes USING GIN (search_vector)")
        .execute(pool)
        .await
        .context("Failed to create recipes search index")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS shopping_lists (
            id BIGSERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            items JSONB NOT NULL DEFAULT '[]',
            date_created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            date_last_edited TIMESTAMPTZ
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create shopping_lists table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS shopping_lists_user_idx ON shopping_lists (user_id)")
        .execute(pool)
        .await
        .context("Failed to create shopping_lists user index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn recipe_from_row(row: &PgRow) -> Result<Recipe, sqlx::Error> {
    let Json(ingredients): Json<Vec<ParsedIngredient>> = row.try_get("ingredients")?;
    let Json(details): Json<RecipeDetails> = row.try_get("details")?;

    Ok(Recipe {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        ingredients,
        tags: row.try_get("tags")?,
        details,
        date_created: row.try_get("date_created")?,
        date_last_edited: row.try_get("date_last_edited")?,
    })
}

fn list_from_row(row: &PgRow) -> Result<ShoppingList, sqlx::Error> {
    let Json(items): Json<Vec<ListItem>> = row.try_get("items")?;

    Ok(ShoppingList {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        date_created: row.try_get("date_created")?,
        date_last_edited: row.try_get("date_last_edited")?,
        items,
    })
}

fn ingredient_names(ingredients: &[ParsedIngredient]) -> String {
    ingredients
        .iter()
        .map(|ingredient| ingredient.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Store a processed recipe
pub async fn create_recipe(pool: &PgPool, recipe: &NewRecipe) -> Result<Recipe, RecipeError> {
    info!(user_id = %recipe.user_id, title = %recipe.title, "Creating recipe");

    let sql = format!(
        "INSERT INTO recipes (user_id, title, ingredients, tags, details, search_vector)
         VALUES ($1, $2, $3, $4, $5, {SEARCH_VECTOR})
         RETURNING {RECIPE_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(&recipe.user_id)
        .bind(&recipe.title)
        .bind(Json(&recipe.ingredients))
        .bind(&recipe.tags)
        .bind(Json(&recipe.details))
        .bind(ingredient_names(&recipe.ingredients))
        .fetch_one(pool)
        .await?;

    let created = recipe_from_row(&row)?;
    info!(recipe_id = created.id, "Recipe created");
    Ok(created)
}

/// Read one of the user's recipes
pub async fn get_recipe(pool: &PgPool, user_id: &str, recipe_id: i64) -> Result<Option<Recipe>, RecipeError> {
    debug!(user_id, recipe_id, "Reading recipe");

    let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2");
    let row = sqlx::query(&sql)
        .bind(recipe_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(recipe_from_row).transpose()?)
}

/// Replace one of the user's recipes with a freshly processed version
pub async fn update_recipe(
    pool: &PgPool,
    recipe_id: i64,
    recipe: &NewRecipe,
) -> Result<Option<Recipe>, RecipeError> {
    info!(user_id = %recipe.user_id, recipe_id, "Updating recipe");

    let sql = format!(
        "UPDATE recipes
         SET title = $2, ingredients = $3, tags = $4, details = $5,
             search_vector = {SEARCH_VECTOR}, date_last_edited = NOW()
         WHERE user_id = $1 AND id = $7
         RETURNING {RECIPE_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(&recipe.user_id)
        .bind(&recipe.title)
        .bind(Json(&recipe.ingredients))
        .bind(&recipe.tags)
        .bind(Json(&recipe.details))
        .bind(ingredient_names(&recipe.ingredients))
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(recipe_from_row(&row)?)),
        None => {
            info!(recipe_id, "No recipe to update");
            Ok(None)
        }
    }
}

/// Delete one of the user's recipes
pub async fn delete_recipe(pool: &PgPool, user_id: &str, recipe_id: i64) -> Result<bool, RecipeError> {
    info!(user_id, recipe_id, "Deleting recipe");

    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(recipe_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Look up one of the user's recipes by the web page it was imported from
pub async fn find_recipe_by_url(pool: &PgPool, user_id: &str, url: &str) -> Result<Option<Recipe>, RecipeError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(RecipeError::MissingField("url"));
    }
    debug!(user_id, url, "Finding recipe by url");

    let sql = format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes
         WHERE user_id = $1 AND details->>'url' = $2
         ORDER BY id LIMIT 1"
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(url)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(recipe_from_row).transpose()?)
}

/// Search the user's recipes
///
/// Every word of `query` must match and a blank query is rejected. Results
/// are ordered by rank, most relevant first. The page query is skipped
/// entirely when nothing matches.
pub async fn search_recipes(
    pool: &PgPool,
    user_id: &str,
    query: &str,
    limit: i64,
    skip: i64,
) -> Result<RecipePage, RecipeError> {
    let terms = search_query(query)?;
    debug!(user_id, terms = %terms, limit, skip, "Searching recipes");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM recipes
         WHERE user_id = $1 AND search_vector @@ plainto_tsquery('english', $2)",
    )
    .bind(user_id)
    .bind(&terms)
    .fetch_one(pool)
    .await?;

    if count == 0 {
        debug!(user_id, "No matching recipes");
        return Ok(RecipePage::empty());
    }

    let sql = format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes
         WHERE user_id = $1 AND search_vector @@ plainto_tsquery('english', $2)
         ORDER BY ts_rank(search_vector, plainto_tsquery('english', $2)) DESC, id
         LIMIT $3 OFFSET $4"
    );
    let recipes = sqlx::query(&sql)
        .bind(user_id)
        .bind(&terms)
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?
        .iter()
        .map(recipe_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    info!(user_id, count, returned = recipes.len(), "Recipe search done");
    Ok(RecipePage { count, recipes })
}

/// Create an empty shopping list
pub async fn create_list(pool: &PgPool, user_id: &str, title: Option<&str>) -> Result<ShoppingList, RecipeError> {
    let title = validate_list_title(title)?;
    info!(user_id, title = %title, "Creating shopping list");

    let sql = format!(
        "INSERT INTO shopping_lists (user_id, title) VALUES ($1, $2) RETURNING {LIST_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(&title)
        .fetch_one(pool)
        .await?;

    Ok(list_from_row(&row)?)
}

/// Read one of the user's lists, with summaries of the recipes it references
pub async fn get_list(pool: &PgPool, user_id: &str, list_id: i64) -> Result<Option<ListView>, RecipeError> {
    debug!(user_id, list_id, "Reading shopping list");

    let sql = format!("SELECT {LIST_COLUMNS} FROM shopping_lists WHERE id = $1 AND user_id = $2");
    let Some(row) = sqlx::query(&sql)
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    let list = list_from_row(&row)?;

    let recipe_ids: Vec<i64> = list.items.iter().filter_map(|item| item.recipe_id).collect();
    let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = $1 AND id = ANY($2)");
    let recipes = sqlx::query(&sql)
        .bind(user_id)
        .bind(&recipe_ids)
        .fetch_all(pool)
        .await?
        .iter()
        .map(recipe_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(list.to_view_with_recipes(&recipes)))
}

/// All of the user's lists, newest first
pub async fn get_lists(pool: &PgPool, user_id: &str) -> Result<Vec<ListView>, RecipeError> {
    debug!(user_id, "Reading shopping lists");

    let sql = format!(
        "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE user_id = $1 ORDER BY date_created DESC, id DESC"
    );
    let lists = sqlx::query(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?
        .iter()
        .map(|row| list_from_row(row).map(|list| list.to_view()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lists)
}

/// Delete one of the user's lists
pub async fn delete_list(pool: &PgPool, user_id: &str, list_id: i64) -> Result<bool, RecipeError> {
    info!(user_id, list_id, "Deleting shopping list");

    let result = sqlx::query("DELETE FROM shopping_lists WHERE id = $1 AND user_id = $2")
        .bind(list_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn lock_list(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    list_id: i64,
) -> Result<Option<ShoppingList>, sqlx::Error> {
    let sql = format!(
        "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE id = $1 AND user_id = $2 FOR UPDATE"
    );
    let row = sqlx::query(&sql)
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

    row.as_ref().map(list_from_row).transpose()
}

async fn save_items(
    tx: &mut Transaction<'_, Postgres>,
    list_id: i64,
    items: &[ListItem],
) -> Result<ShoppingList, sqlx::Error> {
    let sql = format!(
        "UPDATE shopping_lists SET items = $2, date_last_edited = NOW()
         WHERE id = $1 RETURNING {LIST_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(list_id)
        .bind(Json(items))
        .fetch_one(&mut **tx)
        .await?;

    list_from_row(&row)
}

/// Copy a recipe's ingredients into a list, scaled to `servings` when the
/// recipe declares its own serving count
pub async fn add_recipe_to_list(
    pool: &PgPool,
    user_id: &str,
    list_id: i64,
    recipe_id: i64,
    servings: Option<i32>,
) -> Result<ShoppingList, RecipeError> {
    info!(user_id, list_id, recipe_id, ?servings, "Adding recipe to shopping list");

    let recipe = get_recipe(pool, user_id, recipe_id)
        .await?
        .ok_or(RecipeError::NotFound("recipe"))?;

    let mut tx = pool.begin().await?;
    let list = lock_list(&mut tx, user_id, list_id)
        .await?
        .ok_or(RecipeError::NotFound("shopping list"))?;

    let items = scale_recipe_into_items(
        &list.items,
        &recipe.ingredients,
        recipe.id,
        recipe.details.servings,
        servings,
    );
    let updated = save_items(&mut tx, list.id, &items).await?;
    tx.commit().await?;

    Ok(updated)
}

/// Remove every item that was copied from a recipe
pub async fn remove_recipe_from_list(
    pool: &PgPool,
    user_id: &str,
    list_id: i64,
    recipe_id: i64,
) -> Result<Option<ShoppingList>, RecipeError> {
    info!(user_id, list_id, recipe_id, "Removing recipe from shopping list");

    let mut tx = pool.begin().await?;
    let Some(list) = lock_list(&mut tx, user_id, list_id).await? else {
        return Ok(None);
    };

    let items = remove_recipe_items(&list.items, recipe_id);
    let updated = save_items(&mut tx, list.id, &items).await?;
    tx.commit().await?;

    Ok(Some(updated))
}

/// Remove a single item from a list
pub async fn remove_item_from_list(
    pool: &PgPool,
    user_id: &str,
    list_id: i64,
    item_id: i64,
) -> Result<Option<ShoppingList>, RecipeError> {
    info!(user_id, list_id, item_id, "Removing item from shopping list");

    let mut tx = pool.begin().await?;
    let Some(list) = lock_list(&mut tx, user_id, list_id).await? else {
        return Ok(None);
    };

    let items = remove_item(&list.items, item_id);
    let updated = save_items(&mut tx, list.id, &items).await?;
    tx.commit().await?;

    Ok(Some(updated))
}
