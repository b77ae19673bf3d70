pub mod behavioral;
pub mod driver;
pub mod page;
pub mod stealth;
