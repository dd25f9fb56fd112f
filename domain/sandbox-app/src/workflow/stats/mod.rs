pub mod add_stat_block;
pub mod delete_stat_block;
