pub mod admin_controller;
