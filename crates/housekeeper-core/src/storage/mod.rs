mod article_repo;
mod category_repo;
mod database;

pub use article_repo::ArticleRepository;
pub use category_repo::CategoryRepository;
pub use database::Database;
