mod delete_test;
mod document_test;
