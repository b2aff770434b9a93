pub mod unit_record;
