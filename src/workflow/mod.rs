pub mod approval;
pub mod assign;
pub mod broadcast;
pub mod no_show;
pub mod response;
