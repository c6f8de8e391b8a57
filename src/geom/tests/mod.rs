mod test_fit_curve_basic;
